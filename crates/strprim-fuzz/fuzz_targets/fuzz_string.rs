#![no_main]
use libfuzzer_sys::fuzz_target;
use strprim_core::string::{self, TokenCursor, guarded};
use strprim_membrane::SafetyLevel;

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }

    // Layout: [split, dest, src, n, payload...]
    let split = data[0] as usize % (data.len() - 3);
    let (dest, src, n) = (data[1] as usize, data[2] as usize, data[3] as usize);
    let payload = &data[4..];
    let (a, b) = payload.split_at(split.min(payload.len()));

    // Scanners stay inside the logical string.
    let len = string::strlen(a);
    assert!(len <= a.len());
    assert!(a[..len].iter().all(|&c| c != 0));
    if let Some(i) = string::strchr(a, data[1]) {
        assert!(i <= len);
    }
    if let Some(i) = string::strrchr(a, data[1]) {
        assert!(i <= len);
        assert!(string::strchr(a, data[1]).is_some_and(|first| first <= i));
    }
    if let Some(i) = string::strstr(a, b) {
        let needle = string::strlen(b);
        assert!(i + needle <= len);
        assert_eq!(&a[i..i + needle], &b[..needle]);
    }
    let span = string::strspn(a, b);
    let cspan = string::strcspn(a, b);
    assert!(span <= len && cspan <= len);
    assert_eq!(string::strpbrk(a, b).unwrap_or(len), cspan);

    // Comparators are antisymmetric and agree on equality.
    let ab = string::strcmp(a, b).signum();
    assert_eq!(ab, -string::strcmp(b, a).signum());
    assert_eq!(string::strcoll(a, b).signum(), ab);
    let bound = n.min(a.len()).min(b.len());
    if let Ok(m) = string::memcmp(a, b, bound) {
        assert_eq!(m.signum(), -string::memcmp(b, a, bound).unwrap_or(0).signum());
    }

    // memmove matches a copy through a snapshot.
    let mut buf = payload.to_vec();
    let snapshot = buf.clone();
    let mut expected = buf.clone();
    let moved = string::memmove(&mut buf, dest, src, n);
    if moved.is_ok() {
        expected[dest..dest + n].copy_from_slice(&snapshot[src..src + n]);
        assert_eq!(buf, expected);
    } else {
        assert_eq!(buf, snapshot);
    }

    // Hardened copies never leave the destination unterminated.
    let mut out = vec![0xAAu8; dest % 32];
    if guarded::strcpy(&mut out, a, SafetyLevel::Hardened).is_ok() {
        assert!(out.contains(&0));
    }

    // Tokens are non-empty, delimiter-free, and ordered.
    let mut work = a.to_vec();
    let mut cursor = TokenCursor::anchored();
    let set = &b[..string::strlen(b)];
    let mut last_end = 0;
    while let Some(token) = string::strtok_r(&mut work, b, &mut cursor) {
        assert!(token.len > 0);
        assert!(token.start >= last_end);
        let bytes = &work[token.range()];
        assert!(bytes.iter().all(|&c| c != 0 && !set.contains(&c)));
        last_end = token.end();
    }
});
