//! Content-derived identifiers.
//!
//! An asset id is a pure function of the inputs that make a compiled unit
//! distinct: where it came from, what kind of source it is, which
//! environment it targets, an optional disambiguating key and the pipeline
//! that processes it. Identical inputs always hash to the identical id, in
//! this process or any later one, which is what lets cached results be
//! reused across builds.

use std::ffi::OsStr;

/// Length of a rendered id: 128 bits of BLAKE3 output as hex.
pub const ID_HEX_LEN: usize = 32;

/// Inputs to [`compute_asset_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetIdInput<'a> {
    /// The file path, unless an explicit id base overrides it. Hashed as
    /// raw bytes, so paths that are not valid unicode stay distinct.
    pub id_base: &'a OsStr,
    pub asset_type: &'a str,
    pub environment_hash: &'a str,
    /// Defaults to the empty string.
    pub unique_key: Option<&'a str>,
    /// Defaults to the empty string.
    pub pipeline: Option<&'a str>,
}

/// Compute the id of an asset.
pub fn compute_asset_id(input: &AssetIdInput<'_>) -> String {
    digest_fields(&[
        input.id_base.as_encoded_bytes(),
        input.asset_type.as_bytes(),
        input.environment_hash.as_bytes(),
        input.unique_key.unwrap_or_default().as_bytes(),
        input.pipeline.unwrap_or_default().as_bytes(),
    ])
}

/// Compute the id of a dependency edge record.
///
/// Entry dependencies have no source asset and hash an empty string in its
/// place.
pub fn compute_dependency_id(
    source_asset_id: Option<&str>,
    specifier: &str,
    environment_hash: &str,
    pipeline: Option<&str>,
) -> String {
    digest_fields(&[
        source_asset_id.unwrap_or_default().as_bytes(),
        specifier.as_bytes(),
        environment_hash.as_bytes(),
        pipeline.unwrap_or_default().as_bytes(),
    ])
}

/// Hash fields in order, each terminated by a NUL byte so that
/// `("ab", "c")` and `("a", "bc")` hash differently.
pub(crate) fn digest_fields(fields: &[&[u8]]) -> String {
    let mut hasher = blake3::Hasher::new();
    for field in fields {
        hasher.update(field);
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex().as_str()[..ID_HEX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(id_base: &'a str, pipeline: Option<&'a str>) -> AssetIdInput<'a> {
        AssetIdInput {
            id_base: OsStr::new(id_base),
            asset_type: "js",
            environment_hash: "env-hash",
            unique_key: None,
            pipeline,
        }
    }

    #[test]
    fn asset_id_is_deterministic() {
        let first = compute_asset_id(&input("src/index.js", None));
        let second = compute_asset_id(&input("src/index.js", None));
        assert_eq!(first, second);
        assert_eq!(first.len(), ID_HEX_LEN);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn every_input_contributes() {
        let base = compute_asset_id(&input("src/index.js", None));
        assert_ne!(base, compute_asset_id(&input("src/other.js", None)));
        assert_ne!(base, compute_asset_id(&input("src/index.js", Some("url"))));

        let mut keyed = input("src/index.js", None);
        keyed.unique_key = Some("inline-1");
        assert_ne!(base, compute_asset_id(&keyed));

        let mut typed = input("src/index.js", None);
        typed.asset_type = "ts";
        assert_ne!(base, compute_asset_id(&typed));
    }

    #[test]
    fn missing_optionals_equal_empty_strings() {
        let mut explicit = input("a", Some(""));
        explicit.unique_key = Some("");
        assert_eq!(compute_asset_id(&input("a", None)), compute_asset_id(&explicit));
    }

    #[test]
    fn field_boundaries_are_not_ambiguous() {
        assert_ne!(
            digest_fields(&[b"ab".as_slice(), b"c"]),
            digest_fields(&[b"a".as_slice(), b"bc"])
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_bases_stay_distinct() {
        use std::os::unix::ffi::OsStrExt;

        let mut first = input("", None);
        first.id_base = OsStr::from_bytes(b"/p/\xff.js");
        let mut second = input("", None);
        second.id_base = OsStr::from_bytes(b"/p/\xfe.js");

        assert_ne!(compute_asset_id(&first), compute_asset_id(&second));
    }

    #[test]
    fn dependency_ids_depend_on_source() {
        let entry = compute_dependency_id(None, "./app", "env", None);
        let nested = compute_dependency_id(Some("abc"), "./app", "env", None);
        assert_ne!(entry, nested);
        assert_eq!(entry, compute_dependency_id(None, "./app", "env", None));
    }
}
