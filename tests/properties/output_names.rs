//! Property tests for output filename templates.

use proptest::prelude::*;

use assetplan::domain::services::{NameOptions, OutputNameFn};
use assetplan::domain::value_objects::HashAlgo;

fn relative_path() -> impl Strategy<Value = String> {
    let segment = proptest::string::string_regex("[A-Za-z0-9._-]{1,12}").unwrap();
    proptest::collection::vec(segment, 1..=4).prop_map(|segments| segments.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: compiling and rendering never panics, whatever the template.
    #[test]
    fn property_render_never_panics(
        template in "(?s).{0,64}",
        path in "(?s).{0,64}",
        content in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let f = OutputNameFn::compile(&template, &NameOptions::default());
        let _ = f.render(&path, || Ok(content.as_slice()));
    }

    /// PROPERTY: a template without brackets renders to itself.
    #[test]
    fn property_plain_template_is_literal(
        template in "[^\\[]{0,32}",
        path in relative_path(),
    ) {
        let f = OutputNameFn::compile(&template, &NameOptions::default());
        prop_assert!(!f.reads_content());
        prop_assert_eq!(f.render(&path, || Ok(&[][..])).unwrap(), template);
    }

    /// PROPERTY: `[hash:N]` is a prefix of the full digest of the content.
    #[test]
    fn property_hash_width_is_digest_prefix(
        width in 1usize..80,
        content in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let f = OutputNameFn::compile(&format!("[hash:{}]", width), &NameOptions::default());
        let name = f.render("a.js", || Ok(content.as_slice())).unwrap();
        let digest = HashAlgo::Sha256.hex(&content);
        prop_assert_eq!(name.len(), width.min(digest.len()));
        prop_assert!(digest.starts_with(&name));
    }

    /// PROPERTY: `[path]/[basename]` reproduces any nested relative path.
    #[test]
    fn property_path_and_basename_rebuild_path(
        path in relative_path().prop_filter("nested", |p| p.contains('/')),
    ) {
        let f = OutputNameFn::compile("[path]/[basename]", &NameOptions::default());
        prop_assert_eq!(f.render(&path, || Ok(&[][..])).unwrap(), path);
    }
}
