//! Duration probing for ISO base media (MP4 / QuickTime) containers.
//!
//! Only the `moov/mvhd` box is read: its timescale and duration give the
//! presentation length in seconds. Anything that is not a well-formed ISO
//! container yields `None`, so callers can fall back to a client-supplied
//! value.

const MOOV: &[u8; 4] = b"moov";
const MVHD: &[u8; 4] = b"mvhd";

/// Probe the presentation duration in seconds.
pub fn probe_duration(data: &[u8]) -> Option<f64> {
    let moov = find_box(data, MOOV)?;
    let mvhd = find_box(moov, MVHD)?;
    let (timescale, duration) = parse_mvhd(mvhd).ok()?;
    if timescale == 0 {
        return None;
    }
    Some(duration as f64 / f64::from(timescale))
}

/// Find the payload of the first child box with the given type.
fn find_box<'a>(mut data: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    while data.len() >= 8 {
        let size32 = u32::from_be_bytes(data[0..4].try_into().ok()?);
        let box_type = &data[4..8];
        let (header_len, box_len) = match size32 {
            0 => (8usize, data.len()),
            1 => {
                let large = u64::from_be_bytes(data.get(8..16)?.try_into().ok()?);
                (16usize, usize::try_from(large).ok()?)
            }
            n => (8usize, n as usize),
        };
        if box_len < header_len || box_len > data.len() {
            return None;
        }
        if box_type == kind {
            return Some(&data[header_len..box_len]);
        }
        data = &data[box_len..];
    }
    None
}

fn parse_mvhd(body: &[u8]) -> crate::Result<(u32, u64)> {
    let version = *body
        .first()
        .ok_or_else(|| crate::Error::MediaProbe("empty mvhd box".to_string()))?;
    let truncated = || crate::Error::MediaProbe("truncated mvhd box".to_string());
    // version(1) + flags(3), then creation and modification times
    match version {
        0 => {
            let timescale = read_u32(body, 12).ok_or_else(truncated)?;
            let duration = read_u32(body, 16).ok_or_else(truncated)?;
            Ok((timescale, u64::from(duration)))
        }
        1 => {
            let timescale = read_u32(body, 20).ok_or_else(truncated)?;
            let duration = body
                .get(24..32)
                .and_then(|b| b.try_into().ok())
                .map(u64::from_be_bytes)
                .ok_or_else(truncated)?;
            Ok((timescale, duration))
        }
        v => Err(crate::Error::MediaProbe(format!(
            "unsupported mvhd version {v}"
        ))),
    }
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_be_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(payload.len() + 8);
        out.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    fn mvhd_v0(timescale: u32, duration: u32) -> Vec<u8> {
        let mut body = vec![0u8; 4]; // version 0, no flags
        body.extend_from_slice(&0u32.to_be_bytes()); // creation
        body.extend_from_slice(&0u32.to_be_bytes()); // modification
        body.extend_from_slice(&timescale.to_be_bytes());
        body.extend_from_slice(&duration.to_be_bytes());
        body.extend_from_slice(&[0u8; 80]);
        boxed(MVHD, &body)
    }

    #[test]
    fn test_probe_version0() {
        let mut file = boxed(b"ftyp", b"isom\0\0\0\0");
        file.extend(boxed(MOOV, &mvhd_v0(1000, 12_500)));
        assert_eq!(probe_duration(&file), Some(12.5));
    }

    #[test]
    fn test_probe_version1() {
        let mut body = vec![1u8, 0, 0, 0];
        body.extend_from_slice(&0u64.to_be_bytes());
        body.extend_from_slice(&0u64.to_be_bytes());
        body.extend_from_slice(&600u32.to_be_bytes());
        body.extend_from_slice(&(600u64 * 90).to_be_bytes());
        let file = boxed(MOOV, &boxed(MVHD, &body));
        assert_eq!(probe_duration(&file), Some(90.0));
    }

    #[test]
    fn test_probe_skips_unrelated_children() {
        let mut moov = boxed(b"udta", &[1, 2, 3, 4]);
        moov.extend(mvhd_v0(30, 60));
        let file = boxed(MOOV, &moov);
        assert_eq!(probe_duration(&file), Some(2.0));
    }

    #[test]
    fn test_probe_rejects_garbage() {
        assert_eq!(probe_duration(b"definitely not a video"), None);
        assert_eq!(probe_duration(&[]), None);
        // Declared size larger than the buffer
        let mut bad = boxed(MOOV, &mvhd_v0(1000, 1000));
        bad[3] = 0xff;
        assert_eq!(probe_duration(&bad), None);
    }

    #[test]
    fn test_zero_timescale_is_unknown() {
        let file = boxed(MOOV, &mvhd_v0(0, 100));
        assert_eq!(probe_duration(&file), None);
    }
}
