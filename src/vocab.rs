//! Field and MSR vocabularies.
//!
//! # Field table
//!
//! | JSON field | Encoding key |
//! |------------|--------------|
//! | `EventCode` | `event=` |
//! | `UMask` | `umask=` |
//! | `CounterMask` | `cmask=` |
//! | `Invert` | `inv=` |
//! | `AnyThread` | `any=` |
//! | `EdgeDetect` | `edge=` |
//! | `SampleAfterValue` | `period=` |
//!
//! # MSR table
//!
//! | `MSRIndex` | Parameter |
//! |------------|-----------|
//! | `0x3F6` | `ldlat=` |
//! | `0x1A6`, `0x1A7` | `offcore_rsp=` |

use std::fmt;

/// A model-specific register that is programmed through an event parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsrEntry {
    /// Register index as written in event files (e.g. `"0x3F6"`).
    pub index: &'static str,
    /// Event parameter prefix including the `=` (e.g. `"ldlat="`).
    pub param: &'static str,
}

static MSRS: &[MsrEntry] = &[
    MsrEntry {
        index: "0x3F6",
        param: "ldlat=",
    },
    MsrEntry {
        index: "0x1A6",
        param: "offcore_rsp=",
    },
    MsrEntry {
        index: "0x1A7",
        param: "offcore_rsp=",
    },
];

/// Map a JSON field name to its encoding key.
pub fn encoding_key(field: &str) -> Option<&'static str> {
    let key = match field {
        "EventCode" => "event=",
        "UMask" => "umask=",
        "CounterMask" => "cmask=",
        "Invert" => "inv=",
        "AnyThread" => "any=",
        "EdgeDetect" => "edge=",
        "SampleAfterValue" => "period=",
        _ => return None,
    };
    Some(key)
}

/// One `key=value` piece of an encoded event string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub key: &'static str,
    pub value: &'a str,
}

impl fmt::Display for Fragment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.key, self.value)
    }
}

/// Translate a field into an encoding fragment.
///
/// Returns `None` for fields outside the vocabulary and for zero values,
/// which are left out of the event string entirely.
pub fn match_field<'a>(field: &str, non_zero: bool, value: &'a str) -> Option<Fragment<'a>> {
    if !non_zero {
        return None;
    }
    encoding_key(field).map(|key| Fragment {
        key,
        value: truncate_at_comma(value),
    })
}

/// Look up an MSR by index text. Anything after a comma is ignored.
pub fn lookup_msr(value: &str) -> Option<&'static MsrEntry> {
    let index = truncate_at_comma(value);
    MSRS.iter().find(|m| m.index == index)
}

/// Cut a value at its first comma.
///
/// Some event files list several values (`"0x1A6,0x1A7"`); only the first
/// one can be encoded.
pub fn truncate_at_comma(value: &str) -> &str {
    match value.find(',') {
        Some(n) => &value[..n],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_mapping() {
        assert_eq!(encoding_key("EventCode"), Some("event="));
        assert_eq!(encoding_key("UMask"), Some("umask="));
        assert_eq!(encoding_key("CounterMask"), Some("cmask="));
        assert_eq!(encoding_key("Invert"), Some("inv="));
        assert_eq!(encoding_key("AnyThread"), Some("any="));
        assert_eq!(encoding_key("EdgeDetect"), Some("edge="));
        assert_eq!(encoding_key("SampleAfterValue"), Some("period="));
        assert_eq!(encoding_key("eventcode"), None);
        assert_eq!(encoding_key("EventName"), None);
    }

    #[test]
    fn match_field_truncates_and_suppresses_zero() {
        let frag = match_field("EventCode", true, "0xB7,0xBB").unwrap();
        assert_eq!(frag.to_string(), "event=0xB7");
        assert_eq!(match_field("UMask", false, "0"), None);
        assert_eq!(match_field("Unknown", true, "1"), None);
    }

    #[test]
    fn msr_lookup() {
        assert_eq!(lookup_msr("0x3F6").unwrap().param, "ldlat=");
        assert_eq!(lookup_msr("0x1A6").unwrap().param, "offcore_rsp=");
        assert_eq!(lookup_msr("0x1A7,xyz").unwrap().index, "0x1A7");
        assert_eq!(lookup_msr("0x3f6"), None);
        assert_eq!(lookup_msr("0x123"), None);
    }

    #[test]
    fn comma_truncation() {
        assert_eq!(truncate_at_comma("0x1A7,xyz"), "0x1A7");
        assert_eq!(truncate_at_comma("a,b,c"), "a");
        assert_eq!(truncate_at_comma(",a"), "");
        assert_eq!(truncate_at_comma("plain"), "plain");
    }
}
