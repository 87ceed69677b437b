// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html#jvms-4.4.7

/// Decodes the modified UTF-8 used by `CONSTANT_Utf8_info` entries.
///
/// Malformed sequences are replaced with U+FFFD instead of failing, the same
/// way unpaired surrogates are.
pub(crate) fn decode(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| *b != 0 && *b < 0x80) {
        return bytes.iter().map(|b| *b as char).collect();
    }

    let continuation = |i: usize| bytes.get(i).map_or(false, |b| b & 0xc0 == 0x80);

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if b & 0xe0 == 0xc0 && continuation(i + 1) {
            units.push((b as u16 & 0x1f) << 6 | (bytes[i + 1] as u16 & 0x3f));
            i += 2;
        } else if b & 0xf0 == 0xe0 && continuation(i + 1) && continuation(i + 2) {
            units.push(
                (b as u16 & 0x0f) << 12
                    | (bytes[i + 1] as u16 & 0x3f) << 6
                    | (bytes[i + 2] as u16 & 0x3f),
            );
            i += 3;
        } else {
            units.push(0xfffd);
            i += 1;
        }
    }

    String::from_utf16_lossy(&units)
}
