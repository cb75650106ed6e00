//! sgt-sql: SQL 템플릿 엔진
//!
//! 설정된 SQL 템플릿을 요청 필드로 컴파일하고, 실행 결과 행을
//! JSON 객체로 변환합니다.
//!
//! # 모듈 구조
//!
//! - `params`: 요청 필드 파싱
//! - `template`: 파라미터 추출/템플릿 검증/컴파일
//! - `dialect`: 엔진별 플레이스홀더 형식
//! - `marshal`: 결과 행 마샬링
//! - `registry`: API 레지스트리

pub mod dialect;
pub mod marshal;
pub mod params;
pub mod registry;
pub mod template;

pub use dialect::PlaceholderStyle;
pub use marshal::{Cell, MarshalError, ResultRow, RowCursor, RowMarshaler};
pub use params::{FieldValue, RequestFields, Scalar};
pub use registry::{ApiDescriptor, ApiRegistry};
pub use template::{
    compile, compile_with_style, extract_params, validate_template, CompiledStatement,
    TemplateError,
};
