pub mod hit;

pub use hit::{HitSummary, RequestMeta};
