/// Name given to entries whose path is empty once normalized
pub const UNKNOWN_NAME: &str = "unknown";

/// Extensions of the files gcovr reports on. A name carrying one of these is
/// always a file, whatever the listing markup claims.
const SOURCE_EXTENSIONS: [&str; 16] = [
    "c", "cc", "cpp", "cxx", "c++", "h", "hh", "hpp", "hxx", "h++", "ipp", "inl", "tpp", "ixx",
    "cppm", "ii",
];

/// Turns a raw listing name into a slash-separated path with no `.` or `..` segments.
///
/// Leading `./` and `../` segments are stripped textually rather than resolved
/// against the listing's own directory. Inner `..` segments consume the
/// segment before them.
pub fn canonical_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in raw.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        UNKNOWN_NAME.to_string()
    } else {
        segments.join("/")
    }
}

/// Last segment of a canonical path.
pub fn display_name(canonical: &str) -> &str {
    canonical.rsplit('/').next().unwrap_or(canonical)
}

/// Decides whether a listing entry is a directory.
///
/// A known source extension always means file. Otherwise the markup hint
/// wins, and a name without any `.` is taken to be a directory.
pub fn is_directory(display_name: &str, hint: bool) -> bool {
    !has_source_extension(display_name) && (hint || !display_name.contains('.'))
}

fn has_source_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, extension)| {
        SOURCE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
    })
}
