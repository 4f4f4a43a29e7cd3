//! Page-tree key comparison.
//!
//! Ported from `libesedb_page_tree_key.c`. A page-tree key's `compare`
//! determines descent order while walking branch/leaf pages, and carries
//! one quirk inherited from the original implementation: a byte-1
//! "flexible match" rule used by some Windows Search Extensible Storage
//! databases, gated behind [`CompatibilityFlags::WINDOWS_XP_SEARCH_FLEXIBLE_MATCH`]
//! because it is not valid for ordinary ESE files.

use std::cmp::Ordering;

use crate::edb::constants::key_type;

/// Minimal bitflags reimplementation: this crate has no `bitflags`
/// dependency, and a single flag constant doesn't warrant adding one.
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $ty:ty {
            $(const $flag:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name($ty);

        impl $name {
            $(pub const $flag: $name = $name($value);)*

            pub fn contains(&self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::NONE
            }
        }
    };
}

bitflags_like! {
    /// Compatibility toggles for known upstream quirks.
    pub struct CompatibilityFlags: u32 {
        const NONE = 0;
        const WINDOWS_XP_SEARCH_FLEXIBLE_MATCH = 0x0000_0001;
    }
}

/// A page-tree key. `key_type` distinguishes how `data` should be
/// interpreted and compared.
#[derive(Debug, Clone)]
pub struct PageTreeKey {
    pub key_type: u8,
    pub data: Vec<u8>,
}

impl PageTreeKey {
    pub fn new(key_type: u8, data: Vec<u8>) -> Self {
        PageTreeKey { key_type, data }
    }

    /// Compare `self` (typically an INDEX_VALUE, LONG_VALUE, or
    /// LONG_VALUE_SEGMENT key extracted from a search term or record) to
    /// `other` (typically a BRANCH or LEAF key found on a page).
    ///
    /// `other` being empty means "unbounded", and always compares Greater
    /// (this models the rightmost branch key, which has no explicit
    /// value).
    pub fn compare(&self, other: &PageTreeKey, compat: CompatibilityFlags) -> Ordering {
        debug_assert!(matches!(
            self.key_type,
            key_type::INDEX_VALUE | key_type::LONG_VALUE | key_type::LONG_VALUE_SEGMENT
        ));
        debug_assert!(matches!(other.key_type, key_type::BRANCH | key_type::LEAF));

        if other.data.is_empty() {
            return Ordering::Greater;
        }

        if self.key_type == key_type::INDEX_VALUE
            && other.key_type == key_type::LEAF
            && compat.contains(CompatibilityFlags::WINDOWS_XP_SEARCH_FLEXIBLE_MATCH)
        {
            return compare_flexible(&self.data, &other.data);
        }

        // LONG_VALUE keys are ordered by the reversed byte string (matching
        // the on-disk big-endian-ish layout of the long-value id); every
        // other key type compares forward. Either way the result still has
        // to go through the branch/leaf tie-break below — a LONG_VALUE
        // lookup key descending past a BRANCH separator follows the same
        // "stays in current child unless strictly longer" rule as anything
        // else, so this must not early-return before reaching it.
        let ord = if self.key_type == key_type::LONG_VALUE {
            compare_reversed(&self.data, &other.data)
        } else {
            self.data.as_slice().cmp(other.data.as_slice())
        };

        // Branch separators have one extra rule: an INDEX_VALUE lookup key
        // that exactly matches the separator belongs to the *next* child,
        // since INDEX_VALUE ranges are exclusive of their upper bound on
        // this side. LONG_VALUE/LONG_VALUE_SEGMENT keys keep ordinary
        // lexicographic tie-break (a strictly longer lookup key already
        // compares Greater under `cmp`, which is the "stays unless
        // strictly longer" rule verbatim).
        if other.key_type == key_type::BRANCH
            && ord == Ordering::Equal
            && self.key_type == key_type::INDEX_VALUE
        {
            return Ordering::Greater;
        }

        ord
    }
}

/// Compare `a` read from its last byte backwards against `b` read forward
/// from its first byte, as `libesedb_page_tree_key.c:534-578` does for
/// LONG_VALUE keys: only the lookup key (`a`) is byte-reversed, the
/// on-disk key (`b`) is read in its normal stored order.
fn compare_reversed(a: &[u8], b: &[u8]) -> Ordering {
    let mut ai = a.iter().rev();
    let mut bi = b.iter();
    loop {
        match (ai.next(), bi.next()) {
            (Some(x), Some(y)) => match x.cmp(y) {
                Ordering::Equal => continue,
                other => return other,
            },
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return Ordering::Equal,
        }
    }
}

/// The byte-index-1 "flexible match" rule: if byte 0 matches exactly and,
/// at byte index 1, the high bit is set on both sides and the low 7 bits
/// are equal, treat the keys as matching regardless of what follows. This
/// is a verbatim port of an upstream workaround for a subset of Windows
/// Search databases and is not otherwise documented.
fn compare_flexible(a: &[u8], b: &[u8]) -> Ordering {
    if a.len() < 2 || b.len() < 2 {
        return a.cmp(b);
    }
    if a[0] != b[0] {
        return a[0].cmp(&b[0]);
    }
    let a1 = a[1];
    let b1 = b[1];
    if a1 & 0x80 != 0 && b1 & 0x80 != 0 && (a1 & 0x7f) == (b1 & 0x7f) {
        return Ordering::Equal;
    }
    a.cmp(b)
}

/// A value decoded from a page tag, with prefix compression against the
/// previous key on the page (`libesedb_page_tree_value.h`).
#[derive(Debug, Clone)]
pub struct PageTreeValue {
    pub common_key_size: u16,
    pub local_key: Vec<u8>,
    pub data: Vec<u8>,
}

impl PageTreeValue {
    /// Decode a tag's raw bytes. When `has_common_key_size` is set, the
    /// first two bytes are a little-endian `common_key_size` prefix length
    /// to be spliced onto the previous key's leading bytes.
    pub fn read(data: &[u8], has_common_key_size: bool) -> Self {
        if !has_common_key_size {
            return PageTreeValue {
                common_key_size: 0,
                local_key: Vec::new(),
                data: data.to_vec(),
            };
        }

        if data.len() < 2 {
            return PageTreeValue {
                common_key_size: 0,
                local_key: Vec::new(),
                data: data.to_vec(),
            };
        }

        let common_key_size = u16::from_le_bytes([data[0], data[1]]);
        let rest = &data[2..];
        let local_key_size = if rest.len() >= 2 {
            u16::from_le_bytes([rest[0], rest[1]]) as usize
        } else {
            0
        };
        let local_key_start = 2;
        let local_key_end = (local_key_start + local_key_size).min(rest.len());
        let local_key = rest[local_key_start.min(rest.len())..local_key_end].to_vec();
        let value_data = rest[local_key_end..].to_vec();

        PageTreeValue {
            common_key_size,
            local_key,
            data: value_data,
        }
    }

    /// Reconstruct the full key by splicing `common_key_size` bytes from
    /// the previous full key onto `local_key`.
    pub fn full_key(&self, previous_key: &[u8]) -> Vec<u8> {
        let prefix_len = (self.common_key_size as usize).min(previous_key.len());
        let mut key = previous_key[..prefix_len].to_vec();
        key.extend_from_slice(&self.local_key);
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_other_is_always_greater() {
        let a = PageTreeKey::new(key_type::INDEX_VALUE, vec![1, 2, 3]);
        let b = PageTreeKey::new(key_type::LEAF, vec![]);
        assert_eq!(a.compare(&b, CompatibilityFlags::NONE), Ordering::Greater);
    }

    #[test]
    fn test_long_value_compares_reversed() {
        // Only the lookup key (`a`) is read backwards; the on-disk key
        // (`b`) is read forward as stored. `a` reversed is [0x01, 0x02],
        // `b` forward is [0x01, 0x03]: first bytes match, second byte
        // 0x02 < 0x03.
        let a = PageTreeKey::new(key_type::LONG_VALUE, vec![0x02, 0x01]);
        let b = PageTreeKey::new(key_type::LEAF, vec![0x01, 0x03]);
        assert_eq!(a.compare(&b, CompatibilityFlags::NONE), Ordering::Less);
    }

    #[test]
    fn test_long_value_reversed_equal_lengths_match() {
        let a = PageTreeKey::new(key_type::LONG_VALUE, vec![0x03, 0x02, 0x01]);
        let b = PageTreeKey::new(key_type::LEAF, vec![0x01, 0x02, 0x03]);
        assert_eq!(a.compare(&b, CompatibilityFlags::NONE), Ordering::Equal);
    }

    #[test]
    fn test_plain_byte_compare() {
        let a = PageTreeKey::new(key_type::INDEX_VALUE, vec![5]);
        let b = PageTreeKey::new(key_type::BRANCH, vec![3]);
        assert_eq!(a.compare(&b, CompatibilityFlags::NONE), Ordering::Greater);
    }

    #[test]
    fn test_flexible_match_requires_flag() {
        let a = PageTreeKey::new(key_type::INDEX_VALUE, vec![0x01, 0x81]);
        let b = PageTreeKey::new(key_type::LEAF, vec![0x01, 0x01]);
        assert_ne!(a.compare(&b, CompatibilityFlags::NONE), Ordering::Equal);
        assert_eq!(
            a.compare(&b, CompatibilityFlags::WINDOWS_XP_SEARCH_FLEXIBLE_MATCH),
            Ordering::Equal
        );
    }

    #[test]
    fn test_page_tree_value_without_prefix() {
        let value = PageTreeValue::read(&[1, 2, 3], false);
        assert_eq!(value.common_key_size, 0);
        assert_eq!(value.data, vec![1, 2, 3]);
    }
}
