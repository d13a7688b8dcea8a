//! Car Assess Common Library
//!
//! CLIとHTTPサービスで共有される型と、損傷部位 → 合成キーの解決ロジック

pub mod asset;
pub mod defect;
pub mod error;
pub mod key;
pub mod parser;
pub mod report;
pub mod taxonomy;
pub mod types;

pub use asset::{fetch_asset, fetch_asset_or_default, AssetCatalog, BinaryAsset, MemoryCatalog, GLB_CONTENT_TYPE};
pub use defect::{parse_defect, DefectKind, ParsedDefect};
pub use error::{Error, Result};
pub use key::{resolve_key, resolve_key_from_parts, CompositeKey};
pub use parser::{parse_detector_output, DetectorReport};
pub use report::{assemble, assemble_payload, AssessmentResult};
pub use taxonomy::{region_id_of, DefectCategory, PartName, RegionId};
pub use types::{parse_payload, AnalysisPayload, CategorizedDefects, StatusKind};
