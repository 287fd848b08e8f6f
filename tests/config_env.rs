// Env-mutating checks live alone in this file so they cannot race other
// tests in the same process.
use braintrust_export::config::Config;
use braintrust_export::error::ExportError;

#[test]
fn api_key_required_then_defaults_applied() {
    unsafe {
        std::env::remove_var("BRAINTRUST_API_KEY");
        std::env::remove_var("BRAINTRUST_API_URL");
        std::env::remove_var("BRAINTRUST_OUTPUT_DIR");
        std::env::remove_var("BRAINTRUST_LIST_LIMIT");
        std::env::remove_var("BRAINTRUST_EVENT_LIMIT");
    }

    // Missing credential fails before anything else happens
    let err = Config::load().unwrap_err();
    assert!(matches!(err, ExportError::Config { .. }), "got {:?}", err);

    // Blank counts as missing
    unsafe { std::env::set_var("BRAINTRUST_API_KEY", "   ") };
    assert!(matches!(
        Config::load().unwrap_err(),
        ExportError::Config { .. }
    ));

    unsafe { std::env::set_var("BRAINTRUST_API_KEY", "sk-test") };
    let config = Config::load().unwrap();
    assert_eq!(config.api_key, "sk-test");
    assert_eq!(config.api_url, "https://api.braintrust.dev/v1");
    assert_eq!(config.output_dir, "braintrust_data");
    assert_eq!(config.list_page_limit, 10);
    assert_eq!(config.event_page_limit, 100);

    // Overrides: trailing slash trimmed, zero limit clamped, junk ignored
    unsafe {
        std::env::set_var("BRAINTRUST_API_URL", "http://127.0.0.1:9/v1/");
        std::env::set_var("BRAINTRUST_OUTPUT_DIR", "out");
        std::env::set_var("BRAINTRUST_LIST_LIMIT", "0");
        std::env::set_var("BRAINTRUST_EVENT_LIMIT", "not-a-number");
    }
    let config = Config::load().unwrap();
    assert_eq!(config.api_url, "http://127.0.0.1:9/v1");
    assert_eq!(config.output_dir, "out");
    assert_eq!(config.list_page_limit, 1);
    assert_eq!(config.event_page_limit, 100);
}
