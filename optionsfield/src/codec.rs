//! Value semantics for Options fields.
//!
//! Every function here keeps three cases apart: a field untouched by a write
//! (`FieldValue::Absent`), a field explicitly cleared (`FieldValue::Null`),
//! and a field carrying flags (`FieldValue::Set`). Collapsing the first two
//! turns a partial update into data loss.
//!
//! Precedence is always `baseline ← previous ← incoming` and is decided by
//! [`overlay`] alone.

use crate::defaults::{DefaultContext, DefaultSpec};
use crate::types::{FieldValue, FlagSet, OptionList};

/// Every declared option mapped to `None`.
pub fn baseline(options: &OptionList) -> FlagSet {
    options.iter().map(|name| (name, None)).collect()
}

/// Applies `layers` over `base` in order; a later layer wins per key.
pub fn overlay<'a, I>(mut base: FlagSet, layers: I) -> FlagSet
where
    I: IntoIterator<Item = &'a FlagSet>,
{
    for layer in layers {
        base.overlay(layer);
    }
    base
}

/// Fills a set value with `None` for every declared option it does not mention.
/// `Absent` and `Null` pass through unchanged.
pub fn normalize(options: &OptionList, value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Absent => FieldValue::Absent,
        FieldValue::Null => FieldValue::Null,
        FieldValue::Set(flags) => FieldValue::Set(overlay(baseline(options), [flags])),
    }
}

/// Baseline overlaid with the static default or the awaited resolver result.
pub async fn resolve_default(
    options: &OptionList,
    spec: &DefaultSpec,
    ctx: DefaultContext,
) -> FlagSet {
    let base = baseline(options);
    match spec {
        DefaultSpec::Omitted => base,
        DefaultSpec::Static(flags) => overlay(base, [flags]),
        DefaultSpec::Resolver(resolver) => {
            let resolved = resolver(ctx).await;
            overlay(base, [&resolved])
        }
    }
}

/// Reduces an incoming write against the previously stored value.
///
/// - `Absent` in, `Absent` out: the caller must not touch the stored value.
/// - `Null` in, `Null` out: explicit clear.
/// - Otherwise `baseline ← previous ← incoming`, with unset entries dropped.
///   A result with no recorded opinion at all is stored as `Null`, never as an
///   empty object.
///
/// Previously stored flags for names no longer declared are carried over.
pub fn merge_for_write(
    options: &OptionList,
    previous: Option<&FlagSet>,
    incoming: &FieldValue,
) -> FieldValue {
    let incoming = match incoming {
        FieldValue::Absent => return FieldValue::Absent,
        FieldValue::Null => return FieldValue::Null,
        FieldValue::Set(flags) => flags,
    };

    let merged = overlay(baseline(options), previous.into_iter().chain([incoming])).without_unset();

    if merged.is_empty() {
        FieldValue::Null
    } else {
        FieldValue::Set(merged)
    }
}

/// Read projection: one entry per declared option, `None` where nothing is stored.
pub fn project_for_read(options: &OptionList, stored: Option<&FlagSet>) -> FlagSet {
    let projected = overlay(baseline(options), stored);
    options.iter().map(|name| (name, projected.get(name))).collect()
}
