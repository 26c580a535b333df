use std::{
    collections::HashSet,
    fs,
    time::{SystemTime, UNIX_EPOCH},
};

use dwh_copy::JobError;
use dwh_copy::logging::catalog::render_template;
use dwh_copy::logging::{Catalog, Level, MessageId};

#[test]
fn codes_are_unique_and_match_levels() {
    let codes: HashSet<_> = MessageId::ALL.iter().map(|id| id.code()).collect();
    assert_eq!(codes.len(), MessageId::ALL.len());

    assert_eq!(MessageId::JobStart.level(), Level::Info);
    assert_eq!(MessageId::FetchSecret.level(), Level::Debug);
    assert_eq!(MessageId::RollbackFailed.level(), Level::Warn);
    assert_eq!(MessageId::CopyFailed.level(), Level::Error);
}

#[test]
fn builtin_templates_fit_their_arity() {
    // The override path validates templates; feeding the defaults back through it must pass.
    let defaults = MessageId::ALL
        .iter()
        .map(|id| (id.code(), id.default_template()));
    Catalog::with_overrides(defaults).expect("built-in templates are valid");
}

#[test]
fn render_substitutes_positional_arguments() {
    let catalog = Catalog::builtin();
    let rendered = catalog.render(MessageId::CopyEnd, &[&"storage", &"orders"]);
    assert_eq!(
        rendered,
        "Data registration completed (target schema: storage; target table: orders)."
    );
}

#[test]
fn render_leaves_unknown_braces_alone() {
    assert_eq!(render_template("{x} {0} {1} {", &[&5]), "{x} 5 {1} {");
}

#[test]
fn overrides_replace_by_code() {
    let catalog = Catalog::with_overrides([("I_DWH_JB_DB_DATA_COPY_001", "Job {0} begins")])
        .expect("valid override");
    assert_eq!(catalog.render(MessageId::JobStart, &[&"copy"]), "Job copy begins");
    assert_eq!(
        catalog.template(MessageId::JobEnd),
        MessageId::JobEnd.default_template()
    );
}

#[test]
fn overrides_with_unknown_code_or_extra_placeholder_fail() {
    let unknown = Catalog::with_overrides([("I_NOPE_001", "x")]).unwrap_err();
    assert!(matches!(unknown, JobError::Configuration(_)));

    let too_many = Catalog::with_overrides([("I_DWH_JB_DB_DATA_COPY_004", "connected {0}")])
        .unwrap_err();
    assert!(too_many.to_string().contains("I_DWH_JB_DB_DATA_COPY_004"));
}

#[test]
fn overrides_load_from_toml_file() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "dwh-copy-messages-{}-{}.toml",
        std::process::id(),
        nanos
    ));
    fs::write(
        &path,
        "I_DWH_JB_DB_DATA_COPY_003 = \"{0} finished\"\n",
    )
    .expect("write catalog");

    let catalog = Catalog::with_overrides_file(&path).expect("catalog file");
    assert_eq!(catalog.render(MessageId::JobEnd, &[&"copy"]), "copy finished");

    let _ = fs::remove_file(&path);

    let missing = Catalog::with_overrides_file(&path).unwrap_err();
    assert!(matches!(missing, JobError::Configuration(_)));
}
