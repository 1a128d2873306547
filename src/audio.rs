// Audio validator: decides whether a local file is acceptable for the
// audio-order upload by sniffing its magic bytes. Only the header is read,
// never the full file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// MIME types the Kalliope audio endpoint accepts (WAV and MP3).
const ACCEPTED_MIME_TYPES: [&str; 4] =
    ["audio/wav", "audio/x-wav", "audio/mpeg3", "audio/x-mpeg-3"];

/// Longest prefix any of the signatures below needs.
const HEADER_LEN: usize = 12;

/// Inspect `path` and return its MIME type if it is an accepted audio
/// format.
///
/// Fails with [`Error::AudioFileNotFound`] when the path does not reference
/// an existing regular file, and with [`Error::UnsupportedAudioFormat`]
/// when the detected type is not WAV or MP3.
pub fn detect_mime(path: &Path) -> Result<&'static str> {
    if !path.is_file() {
        return Err(Error::AudioFileNotFound(path.to_path_buf()));
    }

    let mut file =
        File::open(path).map_err(|_| Error::AudioFileNotFound(path.to_path_buf()))?;
    let mut header = [0u8; HEADER_LEN];
    let read = read_header(&mut file, &mut header)
        .map_err(|_| Error::AudioFileNotFound(path.to_path_buf()))?;

    let mime = sniff_mime(&header[..read])
        .ok_or_else(|| Error::UnsupportedAudioFormat(path.to_path_buf()))?;
    if !ACCEPTED_MIME_TYPES.contains(&mime) {
        return Err(Error::UnsupportedAudioFormat(path.to_path_buf()));
    }

    debug!("detected {} for {}", mime, path.display());
    Ok(mime)
}

/// Fill `header` from the start of the file, tolerating files shorter than
/// the header window.
fn read_header(file: &mut File, header: &mut [u8]) -> std::io::Result<usize> {
    let mut read = 0;
    while read < header.len() {
        let n = file.read(&mut header[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }
    Ok(read)
}

/// Classify a file header by magic bytes.
fn sniff_mime(header: &[u8]) -> Option<&'static str> {
    // RIFF container holding a WAVE chunk.
    if header.len() >= 12 && &header[0..4] == b"RIFF" && &header[8..12] == b"WAVE" {
        return Some("audio/x-wav");
    }
    // MP3, either with a leading ID3 tag or starting straight at an MPEG
    // audio frame (11 sync bits set).
    if header.len() >= 3 && &header[0..3] == b"ID3" {
        return Some("audio/x-mpeg-3");
    }
    if header.len() >= 2 && header[0] == 0xFF && header[1] & 0xE0 == 0xE0 {
        return Some("audio/x-mpeg-3");
    }
    // Recognized but not accepted upstream.
    if header.len() >= 4 && &header[0..4] == b"OggS" {
        return Some("audio/ogg");
    }
    if header.len() >= 4 && &header[0..4] == b"fLaC" {
        return Some("audio/x-flac");
    }
    None
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const WAV_HEADER: &[u8] = b"RIFF\x24\x08\x00\x00WAVEfmt ";

    fn temp_file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn wav_header_is_accepted() {
        let file = temp_file_with(WAV_HEADER);
        assert_eq!(detect_mime(file.path()).unwrap(), "audio/x-wav");
    }

    #[test]
    fn mp3_id3_tag_is_accepted() {
        let file = temp_file_with(b"ID3\x04\x00\x00\x00\x00\x00\x00");
        assert_eq!(detect_mime(file.path()).unwrap(), "audio/x-mpeg-3");
    }

    #[test]
    fn mp3_frame_sync_is_accepted() {
        let file = temp_file_with(&[0xFF, 0xFB, 0x90, 0x00, 0x00, 0x00]);
        assert_eq!(detect_mime(file.path()).unwrap(), "audio/x-mpeg-3");
    }

    #[test]
    fn text_content_is_rejected() {
        let file = temp_file_with(b"just some plain text, no audio here");
        assert!(matches!(
            detect_mime(file.path()),
            Err(Error::UnsupportedAudioFormat(_))
        ));
    }

    #[test]
    fn ogg_is_recognized_but_rejected() {
        let file = temp_file_with(b"OggS\x00\x02\x00\x00\x00\x00\x00\x00");
        assert!(matches!(
            detect_mime(file.path()),
            Err(Error::UnsupportedAudioFormat(_))
        ));
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = temp_file_with(b"");
        assert!(matches!(
            detect_mime(file.path()),
            Err(Error::UnsupportedAudioFormat(_))
        ));
    }

    #[test]
    fn missing_path_is_not_found() {
        let path = Path::new("/nonexistent/order.wav");
        assert!(matches!(
            detect_mime(path),
            Err(Error::AudioFileNotFound(_))
        ));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            detect_mime(dir.path()),
            Err(Error::AudioFileNotFound(_))
        ));
    }

    #[test]
    fn sniffing_is_deterministic() {
        assert_eq!(sniff_mime(WAV_HEADER), sniff_mime(WAV_HEADER));
        assert_eq!(sniff_mime(b"garbage bytes"), None);
    }
}
