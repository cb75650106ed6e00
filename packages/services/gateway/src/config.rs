//! Gateway 실행 설정

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use sgt_core::{ConfigParser, GatewayConfig};

/// 명령행/환경변수 설정
#[derive(Debug, Clone, Parser)]
#[command(name = "sgt-gateway", version, about = "SQL template JSON gateway")]
pub struct Settings {
    /// 설정 파일 경로
    #[arg(short, long, env = "SGT_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// 서버 포트 (설정 파일 값보다 우선)
    #[arg(short, long, env = "SGT_PORT")]
    pub port: Option<u16>,
}

impl Settings {
    /// 설정 파일 로드
    pub fn load_config(&self) -> anyhow::Result<GatewayConfig> {
        let mut config = ConfigParser::load_file(&self.config)
            .with_context(|| format!("failed to load config {}", self.config.display()))?;
        if let Some(port) = self.port {
            config.server.port = port;
        }
        Ok(config)
    }
}
