//! 로깅 초기화와 회전 로그 파일
//!
//! stdout에는 항상, `log.path`가 있으면 `<path>/runtime.log`에도 기록합니다.
//! 파일이 `log.size` MB를 넘으면 `runtime-<로컬 시각>.log`로 이름을 바꾸고
//! `log.age`(일), `log.backups`(개수)를 넘는 회전 파일을 지웁니다.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use chrono::{Local, NaiveDateTime, TimeDelta};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sgt_core::config::LogConfig;

const DEFAULT_LOG_FILTER: &str = "sgt_gateway=info,tower_http=info";
const LOG_FILE_NAME: &str = "runtime.log";
const BACKUP_PREFIX: &str = "runtime-";
const BACKUP_SUFFIX: &str = ".log";
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// stdout 로깅 + (log.path 지정 시) 회전 파일 로깅
pub fn init_tracing(log: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log.level.as_deref().unwrap_or(DEFAULT_LOG_FILTER)))
        .context("invalid log filter")?;

    let file_layer = match &log.path {
        Some(dir) => {
            let file = RotatingFile::open(dir, log)
                .with_context(|| format!("failed to open log file in {}", dir))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

/// 크기 기준으로 회전하는 로그 파일
#[derive(Debug)]
pub struct RotatingFile {
    dir: PathBuf,
    max_size: u64,
    max_age: Option<TimeDelta>,
    max_backups: Option<usize>,
    file: File,
    size: u64,
}

impl RotatingFile {
    /// `<dir>/runtime.log`를 이어쓰기로 열기 (디렉토리가 없으면 생성)
    pub fn open(dir: impl AsRef<Path>, log: &LogConfig) -> io::Result<Self> {
        let max_age = log
            .max_age_days
            .and_then(|days| i64::try_from(days).ok())
            .and_then(TimeDelta::try_days);
        Self::with_limits(
            dir,
            log.max_size_mb.saturating_mul(1024 * 1024),
            max_age,
            log.max_backups,
        )
    }

    fn with_limits(
        dir: impl AsRef<Path>,
        max_size: u64,
        max_age: Option<TimeDelta>,
        max_backups: Option<usize>,
    ) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let file = open_append(&dir.join(LOG_FILE_NAME))?;
        let size = file.metadata()?.len();
        Ok(Self {
            dir,
            max_size,
            max_age,
            max_backups,
            file,
            size,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let current = self.dir.join(LOG_FILE_NAME);
        let backup = self.dir.join(format!(
            "{}{}{}",
            BACKUP_PREFIX,
            Local::now().format(BACKUP_TIME_FORMAT),
            BACKUP_SUFFIX
        ));
        fs::rename(&current, backup)?;
        self.file = open_append(&current)?;
        self.size = 0;
        self.prune()
    }

    /// 보관 개수/기간을 넘은 회전 파일 삭제
    fn prune(&self) -> io::Result<()> {
        if self.max_age.is_none() && self.max_backups.is_none() {
            return Ok(());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stamp) = backup_time(&name) {
                backups.push((stamp, entry.path()));
            }
        }
        // 최신 순
        backups.sort_by(|a, b| b.0.cmp(&a.0));

        let cutoff = self.max_age.map(|age| Local::now().naive_local() - age);
        for (i, (stamp, path)) in backups.into_iter().enumerate() {
            let too_many = self.max_backups.is_some_and(|max| i >= max);
            let too_old = cutoff.is_some_and(|cutoff| stamp < cutoff);
            if too_many || too_old {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size > 0 && self.size + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.size += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// `runtime-<시각>.log` → 시각
fn backup_time(name: &str) -> Option<NaiveDateTime> {
    let stamp = name
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_SUFFIX)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIME_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backups(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| backup_time(name).is_some())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_backup_time() {
        let stamp = backup_time("runtime-2024-03-01T09-30-00.250.log").unwrap();
        assert_eq!(stamp.to_string(), "2024-03-01 09:30:00.250");
        assert!(backup_time("runtime.log").is_none());
        assert!(backup_time("runtime-latest.log").is_none());
        assert!(backup_time("other-2024-03-01T09-30-00.250.log").is_none());
    }

    #[test]
    fn test_rotates_when_size_exceeded() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RotatingFile::with_limits(dir.path(), 10, None, None).unwrap();

        file.write_all(b"0123456789").unwrap();
        assert!(backups(dir.path()).is_empty());

        file.write_all(b"abc").unwrap();
        file.flush().unwrap();

        let rotated = backups(dir.path());
        assert_eq!(rotated.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join(&rotated[0])).unwrap(),
            "0123456789"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap(),
            "abc"
        );
    }

    #[test]
    fn test_reopen_appends_and_counts_existing_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LOG_FILE_NAME), "12345678").unwrap();

        let mut file = RotatingFile::with_limits(dir.path(), 10, None, None).unwrap();
        file.write_all(b"xyz").unwrap();
        file.flush().unwrap();

        assert_eq!(backups(dir.path()).len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join(LOG_FILE_NAME)).unwrap(),
            "xyz"
        );
    }

    #[test]
    fn test_keeps_newest_backups() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "runtime-2020-01-01T00-00-00.000.log",
            "runtime-2021-01-01T00-00-00.000.log",
            "notes.txt",
        ] {
            fs::write(dir.path().join(name), "old").unwrap();
        }

        let mut file = RotatingFile::with_limits(dir.path(), 1, None, Some(2)).unwrap();
        file.write_all(b"a").unwrap();
        file.write_all(b"b").unwrap();

        let kept = backups(dir.path());
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], "runtime-2021-01-01T00-00-00.000.log");
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn test_removes_expired_backups() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("runtime-2000-01-01T00-00-00.000.log"), "old").unwrap();

        let mut file =
            RotatingFile::with_limits(dir.path(), 1, TimeDelta::try_days(1), None).unwrap();
        file.write_all(b"a").unwrap();
        file.write_all(b"b").unwrap();

        let kept = backups(dir.path());
        assert_eq!(kept.len(), 1);
        assert_ne!(kept[0], "runtime-2000-01-01T00-00-00.000.log");
    }

    #[test]
    fn test_open_uses_config_limits() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogConfig {
            max_size_mb: 2,
            max_age_days: Some(3),
            max_backups: Some(4),
            ..LogConfig::default()
        };
        let file = RotatingFile::open(dir.path().join("nested"), &log).unwrap();
        assert_eq!(file.max_size, 2 * 1024 * 1024);
        assert_eq!(file.max_age, TimeDelta::try_days(3));
        assert_eq!(file.max_backups, Some(4));
        assert!(dir.path().join("nested").join(LOG_FILE_NAME).exists());
    }
}
