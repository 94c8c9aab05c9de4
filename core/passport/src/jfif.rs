/// Density unit value for dots per inch.
const UNITS_DPI: u8 = 1;

/// Offsets inside a JPEG that starts with a JFIF APP0 segment:
/// SOI (0..2), APP0 marker (2..4), segment length (4..6), identifier (6..11),
/// version (11..13), units (13), X density (14..16), Y density (16..18).
const IDENTIFIER: std::ops::Range<usize> = 6..11;
const UNITS: usize = 13;
const X_DENSITY: usize = 14;
const Y_DENSITY: usize = 16;
const MIN_LEN: usize = 18;

/// Whether `data` starts with SOI followed by a JFIF APP0 segment.
pub fn has_jfif_header(data: &[u8]) -> bool {
    data.len() >= MIN_LEN && data[0..4] == [0xFF, 0xD8, 0xFF, 0xE0] && &data[IDENTIFIER] == b"JFIF\0"
}

/// Set the JFIF resolution of a JPEG to `dpi` in both directions.
///
/// Returns the input unchanged if:
/// - The data is shorter than the fixed APP0 layout
/// - SOI is not immediately followed by an APP0 marker
/// - The APP0 identifier is not `JFIF\0`
pub fn set_density_dpi(data: &[u8], dpi: u16) -> Vec<u8> {
    if !has_jfif_header(data) {
        log::warn!("JPEG has no JFIF APP0 header; leaving resolution metadata untouched");
        return data.to_vec();
    }

    let mut patched = data.to_vec();
    let density = dpi.to_be_bytes();
    patched[UNITS] = UNITS_DPI;
    patched[X_DENSITY..X_DENSITY + 2].copy_from_slice(&density);
    patched[Y_DENSITY..Y_DENSITY + 2].copy_from_slice(&density);
    patched
}

/// Read back `(units, x_density, y_density)` from a JFIF header.
pub fn read_density(data: &[u8]) -> Option<(u8, u16, u16)> {
    if !has_jfif_header(data) {
        return None;
    }
    Some((
        data[UNITS],
        u16::from_be_bytes([data[X_DENSITY], data[X_DENSITY + 1]]),
        u16::from_be_bytes([data[Y_DENSITY], data[Y_DENSITY + 1]]),
    ))
}
