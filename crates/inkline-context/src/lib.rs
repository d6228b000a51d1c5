pub mod extractor;

pub use extractor::{
    clamp_offset, current_line_prefix, current_line_suffix, extract, trigger_verdict,
    DocumentContext, TriggerVerdict,
};
