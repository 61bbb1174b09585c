//! # 命令行入口
//!
//! 无界面模式下完成一次修图：加载图片 → 回放笔刷脚本 → 导出二值蒙版 →
//! 提交编辑 → 写出结果与对比图。
//!
//! ```text
//! retouch --input photo.jpg --strokes strokes.json --mask-out mask.png --output fixed.png
//! retouch -i photo.jpg -s strokes.json --mask-only --mask-out mask.png
//! retouch -i photo.jpg -s strokes.json --compare-out compare.png --slider 30
//! ```
//!
//! 笔刷脚本（JSON）：
//!
//! ```json
//! {
//!   "display": { "left": 0, "top": 0, "width": 400, "height": 300 },
//!   "brush_size": 30,
//!   "events": [
//!     { "kind": "press", "x": 50, "y": 50 },
//!     { "kind": "move", "x": 60, "y": 52 },
//!     { "kind": "release" },
//!     { "kind": "mode", "mode": "erase" },
//!     { "kind": "touch_start", "touches": [{ "x": 55, "y": 50 }] },
//!     { "kind": "touch_end" }
//!   ]
//! }
//! ```

use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::canvas::{BrushMode, ClientPoint, DisplayRect, ImageInput, PointerEvent, PointerInput};
use crate::codec;
use crate::comparison::DEFAULT_SLIDER_POSITION;
use crate::edit::{EditService, MaskMode};
use crate::error::AppError;
use crate::session::RetouchSession;
use crate::settings;

/// 蒙版修图命令行工具。
#[derive(Parser, Debug)]
#[command(
    name = "retouch",
    about = "Paint a mask over image defects and send it to a generative edit service",
    long_about = "Load an image, replay a JSON brush script onto its mask, export the\n\
                  binary mask and optionally submit image + mask to the edit service.\n\n\
                  The API key is taken from --api-key, then GEMINI_API_KEY, then the\n\
                  settings file."
)]
pub struct CliArgs {
    /// 源图路径。
    #[arg(short, long, value_name = "IMAGE")]
    pub input: PathBuf,

    /// 笔刷脚本（JSON）。省略时蒙版保持全黑。
    #[arg(short, long, value_name = "STROKES.json")]
    pub strokes: Option<PathBuf>,

    /// 二值蒙版输出路径（PNG）。
    #[arg(long, value_name = "FILE")]
    pub mask_out: Option<PathBuf>,

    /// 结果图输出路径。省略时写入当前目录 `edited-image-<时间戳>.png`。
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// 前后对比图输出路径。
    #[arg(long, value_name = "FILE")]
    pub compare_out: Option<PathBuf>,

    /// 对比滑块位置（0–100）。
    #[arg(long, default_value_t = DEFAULT_SLIDER_POSITION, value_name = "0-100")]
    pub slider: f64,

    /// 本次请求使用的 API Key（优先于环境变量与设置文件）。
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// 设置文件路径。
    #[arg(long, default_value = "settings.json", value_name = "FILE")]
    pub settings: PathBuf,

    /// 不随请求发送蒙版，仅发送指令文本与源图。
    #[arg(long)]
    pub text_only: bool,

    /// 只导出蒙版，不调用编辑服务。
    #[arg(long)]
    pub mask_only: bool,
}

/// 笔刷脚本。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StrokeScript {
    pub display: Option<DisplayRect>,
    pub brush_size: Option<u32>,
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    Press { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release,
    Leave,
    TouchStart { #[serde(default)] touches: Vec<ClientPoint> },
    TouchMove { #[serde(default)] touches: Vec<ClientPoint> },
    TouchEnd,
    Mode { mode: BrushMode },
    Size { size: u32 },
    Clear,
}

impl StrokeScript {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content)
            .map_err(|e| AppError::InvalidInput(format!("笔刷脚本解析失败: {}", e)))
    }

    /// 在会话上回放脚本，返回实际盖章次数。
    pub fn replay(&self, session: &mut RetouchSession) -> usize {
        if let Some(rect) = self.display {
            session.set_display_rect(rect);
        }
        if let Some(size) = self.brush_size {
            session.set_brush_size(size);
        }

        let mut stamps = 0;
        for event in &self.events {
            let pointer = match event {
                ScriptEvent::Press { x, y } => {
                    PointerEvent::Down(PointerInput::Pointer(ClientPoint::new(*x, *y)))
                }
                ScriptEvent::Move { x, y } => {
                    PointerEvent::Move(PointerInput::Pointer(ClientPoint::new(*x, *y)))
                }
                ScriptEvent::TouchStart { touches } => {
                    PointerEvent::Down(PointerInput::Touch(touches.clone()))
                }
                ScriptEvent::TouchMove { touches } => {
                    PointerEvent::Move(PointerInput::Touch(touches.clone()))
                }
                ScriptEvent::Release | ScriptEvent::TouchEnd => PointerEvent::Up,
                ScriptEvent::Leave => PointerEvent::Leave,
                ScriptEvent::Mode { mode } => {
                    session.set_brush_mode(*mode);
                    continue;
                }
                ScriptEvent::Size { size } => {
                    session.set_brush_size(*size);
                    continue;
                }
                ScriptEvent::Clear => {
                    session.clear_mask();
                    continue;
                }
            };

            if session.handle_pointer(&pointer).is_some() {
                stamps += 1;
            }
        }

        // 输入流结束视同抬笔
        session.handle_pointer(&PointerEvent::Up);
        stamps
    }
}

/// 一次运行产生的文件。
#[derive(Debug, Default)]
pub struct RunReport {
    pub mask: Option<PathBuf>,
    pub result: Option<PathBuf>,
    pub comparison: Option<PathBuf>,
}

/// 执行一次命令行修图；`env_key` 为 `GEMINI_API_KEY` 的值。
pub async fn run(args: CliArgs, env_key: Option<String>) -> Result<RunReport, AppError> {
    let mut report = RunReport::default();
    let mut session = RetouchSession::default();

    let (width, height) = session.load_image(ImageInput::FilePath(args.input.clone()))?;
    log::info!("📥 已加载 {}（画布 {}x{}）", args.input.display(), width, height);

    if let Some(path) = &args.strokes {
        let script = StrokeScript::load(path)?;
        let stamps = script.replay(&mut session);
        log::info!(
            "🖌️ 笔刷脚本回放完成 - 事件: {} 盖章: {} 蒙版像素: {}",
            script.events.len(),
            stamps,
            session.mask().painted_pixel_count()
        );
    }

    if let Some(path) = &args.mask_out {
        session.export_mask(path)?;
        report.mask = Some(path.clone());
    }

    if args.mask_only {
        return Ok(report);
    }

    let mut config = settings::load_settings(&args.settings)?.into_service_config(env_key);
    if args.text_only {
        config.mask_mode = MaskMode::TextOnly;
    }
    let service = EditService::new(config)?;

    session.submit(&service, args.api_key.as_deref()).await?;

    report.result = Some(match &args.output {
        Some(path) => {
            let result = session.result().ok_or(AppError::NoResult)?;
            fs::write(path, codec::encode_png(result.image())?)?;
            path.clone()
        }
        None => session.download(Path::new("."))?,
    });

    if let Some(path) = &args.compare_out {
        let view = session.comparison(args.slider)?;
        fs::write(path, codec::encode_png(&view)?)?;
        report.comparison = Some(path.clone());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::fake_service::{self, FakeResponse};
    use image::{Rgba, RgbaImage};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("photo-retouch-cli-{}-{}", std::process::id(), name));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_source(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("source.png");
        let image = RgbaImage::from_pixel(width, height, Rgba([90, 90, 90, 255]));
        fs::write(&path, codec::encode_png(&image).expect("encode")).expect("write source");
        path
    }

    fn args(input: PathBuf) -> CliArgs {
        CliArgs::parse_from(["retouch", "--input", input.to_str().expect("utf8 path")])
    }

    #[test]
    fn parses_flags() {
        let args = CliArgs::parse_from([
            "retouch", "-i", "a.png", "-s", "s.json", "--text-only", "--slider", "25", "--api-key", "k",
        ]);

        assert_eq!(args.input, PathBuf::from("a.png"));
        assert_eq!(args.strokes, Some(PathBuf::from("s.json")));
        assert!(args.text_only);
        assert!(!args.mask_only);
        assert_eq!(args.slider, 25.0);
        assert_eq!(args.api_key.as_deref(), Some("k"));
        assert_eq!(args.settings, PathBuf::from("settings.json"));
    }

    #[test]
    fn parses_script_events() {
        let script = StrokeScript::parse(
            r#"{"brush_size": 12, "events": [
                {"kind": "press", "x": 1, "y": 2},
                {"kind": "touch_start", "touches": []},
                {"kind": "mode", "mode": "erase"},
                {"kind": "release"}
            ]}"#,
        )
        .expect("parse script");

        assert_eq!(script.brush_size, Some(12));
        assert_eq!(script.events[0], ScriptEvent::Press { x: 1.0, y: 2.0 });
        assert_eq!(script.events[1], ScriptEvent::TouchStart { touches: vec![] });
        assert_eq!(script.events[2], ScriptEvent::Mode { mode: BrushMode::Erase });
    }

    #[test]
    fn unknown_event_kind_is_input_error() {
        let err = StrokeScript::parse(r#"{"events": [{"kind": "wiggle"}]}"#).expect_err("bad kind");
        assert_eq!(err.code(), "E_INPUT");
    }

    #[test]
    fn replay_paints_then_erases() {
        let dir = temp_dir("replay");
        let mut session = RetouchSession::default();
        session
            .load_image(ImageInput::FilePath(write_source(&dir, 200, 100)))
            .expect("load");

        let script = StrokeScript::parse(
            r#"{"display": {"left": 0, "top": 0, "width": 100, "height": 50}, "brush_size": 10,
                "events": [
                {"kind": "move", "x": 10, "y": 10},
                {"kind": "press", "x": 25, "y": 25},
                {"kind": "release"},
                {"kind": "touch_start", "touches": [{"x": 75, "y": 25}]},
                {"kind": "touch_end"}
            ]}"#,
        )
        .expect("parse");

        assert_eq!(script.replay(&mut session), 2);
        let mask = session.binary_mask();
        assert!(mask.is_covered(50, 50));
        assert!(mask.is_covered(150, 50));
        assert!(!mask.is_covered(20, 20));

        let erase = StrokeScript::parse(
            r#"{"events": [
                {"kind": "mode", "mode": "erase"},
                {"kind": "press", "x": 25, "y": 25},
                {"kind": "touch_start", "touches": [{"x": 75, "y": 25}]}
            ]}"#,
        )
        .expect("parse erase");
        erase.replay(&mut session);
        let _ = fs::remove_dir_all(&dir);

        assert!(session.binary_mask().is_all_black());
    }

    #[test]
    fn clear_event_wipes_earlier_strokes() {
        let dir = temp_dir("clear");
        let mut session = RetouchSession::default();
        session
            .load_image(ImageInput::FilePath(write_source(&dir, 60, 60)))
            .expect("load");
        let _ = fs::remove_dir_all(&dir);

        let script = StrokeScript::parse(
            r#"{"events": [
                {"kind": "press", "x": 20, "y": 20},
                {"kind": "release"},
                {"kind": "clear"},
                {"kind": "size", "size": 10},
                {"kind": "press", "x": 50, "y": 50}
            ]}"#,
        )
        .expect("parse");

        assert_eq!(script.replay(&mut session), 2);
        let mask = session.binary_mask();
        assert!(!mask.is_covered(20, 20));
        assert!(mask.is_covered(50, 50));
        assert_eq!(session.brush().size(), 10);
    }

    #[tokio::test]
    async fn mask_only_run_skips_service() {
        let dir = temp_dir("mask-only");
        let mut args = args(write_source(&dir, 1000, 750));
        let strokes = dir.join("strokes.json");
        fs::write(&strokes, r#"{"events": [{"kind": "press", "x": 100, "y": 100}]}"#).expect("write strokes");
        args.strokes = Some(strokes);
        args.mask_out = Some(dir.join("mask.png"));
        args.mask_only = true;

        let report = run(args, None).await.expect("run");
        let mask = image::open(dir.join("mask.png")).expect("open mask").to_rgba8();
        let _ = fs::remove_dir_all(&dir);

        assert!(report.result.is_none());
        assert_eq!(mask.dimensions(), (800, 600));
        assert_eq!(mask.get_pixel(100, 100), &Rgba([255, 255, 255, 255]));
        assert_eq!(mask.get_pixel(131, 100), &Rgba([0, 0, 0, 255]));
    }

    #[tokio::test]
    async fn full_run_writes_result_and_comparison() {
        let dir = temp_dir("full");
        let edited = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 250, 255]));
        let (endpoint, server) = fake_service::spawn(FakeResponse::image(&edited));
        let settings_path = dir.join("settings.json");
        fs::write(&settings_path, format!(r#"{{"endpoint": "{}"}}"#, endpoint)).expect("write settings");

        let mut args = args(write_source(&dir, 40, 20));
        args.settings = settings_path;
        args.output = Some(dir.join("out.png"));
        args.compare_out = Some(dir.join("compare.png"));

        let report = run(args, Some("env-key".into())).await.expect("run");
        let request = server.join().expect("server thread");
        let compare = image::open(dir.join("compare.png")).expect("open compare").to_rgba8();
        let _ = fs::remove_dir_all(&dir);

        assert!(request.head_contains("x-goog-api-key: env-key"));
        assert_eq!(report.result, Some(dir.join("out.png")));
        assert_eq!(compare.get_pixel(19, 0), &Rgba([90, 90, 90, 255]));
        assert_eq!(compare.get_pixel(20, 0), &Rgba([0, 0, 250, 255]));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_sending() {
        let dir = temp_dir("no-key");
        let mut args = args(write_source(&dir, 10, 10));
        args.settings = dir.join("absent.json");

        let err = run(args, None).await.expect_err("missing key");
        let _ = fs::remove_dir_all(&dir);

        assert_eq!(err.code(), "E_NO_CREDENTIAL");
    }
}
