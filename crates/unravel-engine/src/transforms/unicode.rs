use crate::detector::INVISIBLE_ALPHABET;

fn bits_of(c: char) -> Option<&'static str> {
    INVISIBLE_ALPHABET
        .iter()
        .find(|(ch, _)| *ch == c)
        .map(|(_, bits)| *bits)
}

/// Decode runs of zero-width characters into the text they smuggle.
///
/// Each maximal run maps to a bit string; a run whose bit count is a multiple
/// of 8 decodes to one character per byte. Other runs are left in place.
/// Returns `None` when nothing was decoded.
pub fn decode_invisible_unicode(source: &str) -> Option<String> {
    let mut out = String::with_capacity(source.len());
    let mut run = String::new();
    let mut bits = String::new();
    let mut decoded_any = false;

    let mut flush = |run: &mut String, bits: &mut String, out: &mut String| {
        if run.is_empty() {
            return;
        }
        match decode_bits(bits) {
            Some(text) => {
                out.push_str(&text);
                decoded_any = true;
            }
            None => out.push_str(run),
        }
        run.clear();
        bits.clear();
    };

    for c in source.chars() {
        match bits_of(c) {
            Some(pattern) => {
                run.push(c);
                bits.push_str(pattern);
            }
            None => {
                flush(&mut run, &mut bits, &mut out);
                out.push(c);
            }
        }
    }
    flush(&mut run, &mut bits, &mut out);

    decoded_any.then_some(out)
}

fn decode_bits(bits: &str) -> Option<String> {
    if bits.is_empty() || bits.len() % 8 != 0 {
        return None;
    }
    bits.as_bytes()
        .chunks(8)
        .map(|chunk| {
            let byte = std::str::from_utf8(chunk).ok()?;
            u8::from_str_radix(byte, 2).ok().map(char::from)
        })
        .collect()
}
