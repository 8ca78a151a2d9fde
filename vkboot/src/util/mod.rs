use std::ffi::{c_char, CStr, CString};

/// Utility functions commonly used
pub mod deletion_stack;
pub use deletion_stack::DeletionStack;

/// Thanks phobos
/// https://github.com/NotAPenguin0/phobos-rs/blob/2a1e539611bb3ede5c2d7978300353630c7c553b/src/util/string.rs#L7
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub fn wrap_c_str(c: *const c_char) -> CString {
    if c.is_null() {
        CString::default()
    } else {
        unsafe { CStr::from_ptr(c) }.to_owned()
    }
}

/// Reads a fixed-size, nul-terminated name array as the driver reports it (layer names,
/// device names)
pub fn fixed_c_str(raw: &[c_char]) -> CString {
    let bytes: Vec<u8> = raw
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    // No interior nul is possible, the scan stopped at the first one
    CString::new(bytes).unwrap_or_default()
}

#[cfg(test)]
mod string_tests {
    use super::*;

    #[test]
    fn fixed_name_stops_at_first_nul() {
        let mut raw = [0 as c_char; 16];
        for (slot, byte) in raw.iter_mut().zip(b"VK_LAYER_x\0junk") {
            *slot = *byte as c_char;
        }
        assert_eq!(fixed_c_str(&raw).as_bytes(), b"VK_LAYER_x");
    }

    #[test]
    fn null_pointer_is_empty() {
        assert!(wrap_c_str(std::ptr::null()).as_bytes().is_empty());
    }
}
