use std::fmt;

/// Hex characters occupied by the fixed frame header (4 bytes).
const HEADER_CHARS: usize = 8;
/// Hex characters occupied by the fixed frame trailer (2 bytes).
const TRAILER_CHARS: usize = 4;
/// Each group carries 12 bits of EPC data.
const GROUP_CHARS: usize = 3;
/// At most 8 groups, i.e. 24 hex characters of canonical tag.
const MAX_GROUPS: usize = 8;

/// Canonical form of one RFID tag read.
///
/// The compact form (`as_str`) is what goes over the wire and into the dedup
/// window; `display` re-inserts group separators for logs. The inner string
/// is always 0 or a multiple of 3 characters long, capped at 24.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalTag(String);

impl CanonicalTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Space-joined 3-character groups, for display only.
    pub fn display(&self) -> String {
        self.0
            .as_bytes()
            .chunks(GROUP_CHARS)
            .map(|group| std::str::from_utf8(group).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CanonicalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode one raw serial read into its canonical tag.
///
/// The raw frame is rendered as lowercase hex, the fixed header and trailer
/// are stripped, and the remainder is re-grouped into up to 8 groups of 3 hex
/// characters. A trailing partial group is dropped. Short or malformed frames
/// degrade to the empty tag; callers treat that as "no tag this cycle".
pub fn canonicalize(raw: &[u8]) -> CanonicalTag {
    let hex: String = raw.iter().map(|byte| format!("{byte:02x}")).collect();
    if hex.len() < HEADER_CHARS + TRAILER_CHARS + GROUP_CHARS {
        return CanonicalTag(String::new());
    }

    let body = &hex[HEADER_CHARS..hex.len() - TRAILER_CHARS];
    let body = &body[..body.len().min(MAX_GROUPS * GROUP_CHARS)];
    let compact: String = body
        .as_bytes()
        .chunks_exact(GROUP_CHARS)
        .filter_map(|group| std::str::from_utf8(group).ok())
        .collect();
    CanonicalTag(compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_from_hex(hex: &str) -> Vec<u8> {
        hex.as_bytes()
            .chunks(2)
            .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap())
            .collect()
    }

    #[test]
    fn strips_header_and_trailer_and_groups_remainder() {
        let raw = raw_from_hex("aabbccdd112233445566778899eeff");
        let tag = canonicalize(&raw);
        assert_eq!(tag.as_str(), "112233445566778899");
        assert_eq!(tag.display(), "112 233 445 566 778 899");
    }

    #[test]
    fn is_deterministic() {
        let raw = raw_from_hex("aabbccdd112233445566778899eeff");
        assert_eq!(canonicalize(&raw), canonicalize(&raw));
    }

    #[test]
    fn short_frames_degrade_to_empty() {
        assert!(canonicalize(&[]).is_empty());
        assert!(canonicalize(&raw_from_hex("aabbccddeeff")).is_empty());
        // One char left after stripping: below one full group.
        assert!(canonicalize(&raw_from_hex("aabbccdd1122ee")).is_empty());
    }

    #[test]
    fn drops_trailing_partial_group() {
        // Eight chars of body: two full groups plus two leftover chars.
        let raw = raw_from_hex("aabbccdd11223344eeff");
        let tag = canonicalize(&raw);
        assert_eq!(tag.as_str(), "112233");
    }

    #[test]
    fn caps_at_eight_groups() {
        // 40 hex chars of body; only the first 24 survive.
        let body = "112233445566778899aabbccddeeff0011223344";
        let raw = raw_from_hex(&format!("aabbccdd{body}eeff"));
        let tag = canonicalize(&raw);
        assert_eq!(tag.as_str(), &body[..24]);
        assert_eq!(tag.as_str().len(), 24);
    }

    #[test]
    fn length_is_zero_or_multiple_of_three() {
        for len in 0..32 {
            let raw: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let tag = canonicalize(&raw);
            assert_eq!(tag.as_str().len() % 3, 0);
            assert!(tag.as_str().len() <= 24);
        }
    }
}
