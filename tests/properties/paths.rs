//! Property tests for path helpers.

use std::path::Path;

use proptest::prelude::*;

use assetplan::domain::value_objects::path::{
    basename, extname, fix_relative_path, resolve, stem, to_slash, to_url,
};

fn segments() -> impl Strategy<Value = Vec<String>> {
    let segment = proptest::string::string_regex("[A-Za-z0-9_-]([A-Za-z0-9._-]{0,10}[A-Za-z0-9_-])?").unwrap();
    proptest::collection::vec(segment, 1..=4)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: URLs always carry exactly one leading slash.
    #[test]
    fn property_url_has_one_leading_slash(
        path in "[A-Za-z0-9./_-]{0,32}"
    ) {
        let url = to_url(&path);
        prop_assert!(url.starts_with('/'));
        prop_assert!(!url.starts_with("//"));
        prop_assert!(!fix_relative_path(&path).starts_with('/'));
    }

    /// PROPERTY: basename is the last segment and never contains a slash.
    #[test]
    fn property_basename_is_last_segment(
        parts in segments()
    ) {
        let path = parts.join("/");
        prop_assert_eq!(basename(&path), parts.last().unwrap().as_str());
    }

    /// PROPERTY: a name with an extension is stem, dot, extension.
    #[test]
    fn property_stem_and_ext_rebuild_basename(
        parts in segments()
    ) {
        let path = parts.join("/");
        let ext = extname(&path);
        if !ext.is_empty() {
            prop_assert_eq!(format!("{}.{}", stem(&path), ext), basename(&path));
        } else {
            prop_assert_eq!(stem(&path), basename(&path));
        }
    }

    /// PROPERTY: resolving plain segments is a join, and renders back with slashes.
    #[test]
    fn property_resolve_plain_segments_is_join(
        parts in segments()
    ) {
        let relative = parts.join("/");
        let base = Path::new("/base");
        let resolved = resolve(base, &relative);
        prop_assert_eq!(&resolved, &base.join(&relative));
        prop_assert_eq!(to_slash(resolved.strip_prefix(base).unwrap()), relative);
    }
}
