//! # 蒙版修图工具：命令行入口
//!
//! 本文件只负责日志初始化、参数解析与退出码，业务逻辑见 `lib.rs` 架构文档。

use std::process::ExitCode;

use clap::Parser;
use photo_retouch::cli::{self, CliArgs};
use photo_retouch::settings::API_KEY_ENV;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let env_key = std::env::var(API_KEY_ENV).ok();

    match cli::run(args, env_key).await {
        Ok(report) => {
            if let Some(path) = report.mask {
                println!("mask: {}", path.display());
            }
            if let Some(path) = report.result {
                println!("result: {}", path.display());
            }
            if let Some(path) = report.comparison {
                println!("comparison: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("运行失败 [{}]: {}", err.code(), err);
            eprintln!("{}", err.guidance());
            ExitCode::FAILURE
        }
    }
}
