// tests/category_config.rs
//
// Category table loading: env override, shipped default, and the error on
// a dangling env path. Serial because the tests mutate process env.

use serial_test::serial;

use newsdesk::news::query::{CategoryExpr, CategoryTable, ENV_CATEGORY_CONFIG_PATH};

#[test]
#[serial]
fn env_override_takes_precedence() {
    let path = std::env::temp_dir().join(format!(
        "newsdesk_categories_{}.toml",
        std::process::id()
    ));
    std::fs::write(
        &path,
        "[[categories]]\nname = \"solar\"\nkeywords = [\"sun\", \"pv\"]\n",
    )
    .expect("write scratch config");

    std::env::set_var(ENV_CATEGORY_CONFIG_PATH, &path);
    let table = CategoryTable::load_default().expect("load from env path");
    std::env::remove_var(ENV_CATEGORY_CONFIG_PATH);

    assert_eq!(table.names(), vec!["solar"]);
    assert_eq!(
        table.resolve("solar", "thenewsapi"),
        CategoryExpr::Keywords("sun OR pv".into())
    );

    let _ = std::fs::remove_file(&path);
}

#[test]
#[serial]
fn dangling_env_path_is_an_error() {
    std::env::set_var(ENV_CATEGORY_CONFIG_PATH, "/definitely/not/here.toml");
    let res = CategoryTable::load_default();
    std::env::remove_var(ENV_CATEGORY_CONFIG_PATH);
    assert!(res.is_err());
}

#[test]
#[serial]
fn shipped_config_is_the_default() {
    std::env::remove_var(ENV_CATEGORY_CONFIG_PATH);
    // cargo test runs from the crate root, where config/categories.toml ships.
    let table = CategoryTable::load_default().expect("load shipped config");
    assert!(table.names().iter().any(|n| n == "technology"));
    assert_eq!(
        table.resolve("technology", "thenewsapi"),
        CategoryExpr::Token("tech".into())
    );
}
