//! Small pure helpers shared across handlers and services.

/// Resolve a MIME type from a file name's extension.
///
/// Deterministic lookup table; anything unrecognized (including names
/// without an extension) falls back to `application/octet-stream`.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" => "text/html",
        "csv" => "text/csv",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::content_type_for;

    #[test]
    fn known_extensions_map_to_fixed_types() {
        assert_eq!(content_type_for("photo.jpg"), "image/jpeg");
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("diagram.png"), "image/png");
        assert_eq!(content_type_for("anim.gif"), "image/gif");
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("index.html"), "text/html");
        assert_eq!(content_type_for("export.csv"), "text/csv");
        assert_eq!(content_type_for("payload.json"), "application/json");
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(content_type_for("SCAN.PDF"), "application/pdf");
        assert_eq!(content_type_for("photo.JpG"), "image/jpeg");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back() {
        assert_eq!(content_type_for("archive.tar.zst"), "application/octet-stream");
        assert_eq!(content_type_for("Makefile"), "application/octet-stream");
        assert_eq!(content_type_for(""), "application/octet-stream");
        assert_eq!(content_type_for("trailing."), "application/octet-stream");
    }

    #[test]
    fn only_the_last_extension_counts() {
        assert_eq!(content_type_for("backup.pdf.txt"), "text/plain");
    }
}
