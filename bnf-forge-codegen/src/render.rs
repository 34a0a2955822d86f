use bnf_forge_model::Model;
use proc_macro2::TokenStream;

/// Renders one generated Rust file: a fixed header, then every item on its own
/// paragraph. No timestamps, so identical input renders identical bytes.
pub(crate) fn rust_file(model: &Model, items: &[TokenStream]) -> String {
    let mut out = header(model);
    for item in items.iter().filter(|item| !item.is_empty()) {
        out.push('\n');
        out.push_str(&item.to_string());
        out.push('\n');
    }
    out
}

pub(crate) fn header(model: &Model) -> String {
    format!(
        "// @generated by bnf-forge from {} {}. Do not edit.\n",
        model.name, model.version
    )
}

/// `dir/file`, or `file` when `dir` is empty.
pub(crate) fn file_key(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn test_rust_file_layout() {
        let model = Model::builder("Demo", "A").literal("A", "a").build();
        let text = rust_file(&model, &[quote! { pub struct A; }, TokenStream::new()]);
        assert_eq!(
            text,
            "// @generated by bnf-forge from Demo 1.0.0. Do not edit.\n\npub struct A ;\n"
        );
    }

    #[test]
    fn test_file_key() {
        assert_eq!(file_key("", "mod.rs"), "mod.rs");
        assert_eq!(file_key("src/ast/", "mod.rs"), "src/ast/mod.rs");
    }
}
