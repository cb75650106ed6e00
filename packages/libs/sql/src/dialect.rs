//! 플레이스홀더 방언
//!
//! 컴파일러가 플레이스홀더를 직접 쓰므로 템플릿 본문에 원래 있던 `?`
//! (PostgreSQL jsonb 연산자 등)는 번호 매기기에 섞이지 않습니다.

use std::fmt::Write;

use sgt_core::config::Engine;

/// 엔진별 플레이스홀더 형식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` (MySQL, SQLite)
    #[default]
    Question,
    /// `$1` (PostgreSQL)
    Dollar,
}

impl PlaceholderStyle {
    pub fn for_engine(engine: Engine) -> Self {
        match engine {
            Engine::Postgres => PlaceholderStyle::Dollar,
            Engine::MySql | Engine::Sqlite => PlaceholderStyle::Question,
        }
    }

    /// `index`번째(1부터) 플레이스홀더 기록
    pub(crate) fn write(&self, out: &mut String, index: usize) {
        match self {
            PlaceholderStyle::Question => out.push('?'),
            PlaceholderStyle::Dollar => {
                let _ = write!(out, "${}", index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_engine() {
        assert_eq!(PlaceholderStyle::for_engine(Engine::Postgres), PlaceholderStyle::Dollar);
        assert_eq!(PlaceholderStyle::for_engine(Engine::MySql), PlaceholderStyle::Question);
        assert_eq!(PlaceholderStyle::for_engine(Engine::Sqlite), PlaceholderStyle::Question);
    }

    #[test]
    fn test_write() {
        let mut out = String::new();
        PlaceholderStyle::Dollar.write(&mut out, 1);
        out.push(',');
        PlaceholderStyle::Dollar.write(&mut out, 12);
        out.push(',');
        PlaceholderStyle::Question.write(&mut out, 3);
        assert_eq!(out, "$1,$12,?");
    }
}
