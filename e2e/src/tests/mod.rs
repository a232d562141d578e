//! Test registry
//!
//! Cases are grouped by launch: most run against a proxy started with
//! `GEMINI_API_KEY`, the `unset_key` ones against a proxy started without it.

pub mod helpers;
pub mod server;

use crate::launch::Launch;
use crate::runner::{CaseFuture, TestCase};

pub fn all_tests() -> Vec<TestCase> {
    macro_rules! case {
        ($launch:ident, $name:expr, $about:expr, $func:path) => {
            TestCase {
                name: $name,
                about: $about,
                launch: Launch::$launch,
                run: |ctx| -> CaseFuture { Box::pin($func(ctx)) },
            }
        };
    }

    vec![
        // Prompt in, Gemini reply out
        case!(
            WithKey,
            "generate/prompt_relayed",
            "Prompt is wrapped into contents/parts and the reply is relayed verbatim",
            generate::test_prompt_relayed
        ),
        case!(
            WithKey,
            "generate/api_key_forwarded",
            "Upstream key query parameter equals GEMINI_API_KEY",
            generate::test_api_key_forwarded
        ),
        case!(
            WithKey,
            "generate/missing_prompt_forwarded",
            "Body without prompt still calls upstream with text:null",
            generate::test_missing_prompt_forwarded
        ),
        case!(
            WithKey,
            "generate/extra_fields_ignored",
            "Only the prompt reaches the upstream payload",
            generate::test_extra_fields_ignored
        ),
        case!(
            WithKey,
            "generate/one_call_per_request",
            "Each request results in exactly one upstream call",
            generate::test_one_call_per_request
        ),
        // Upstream or caller misbehaving
        case!(
            WithKey,
            "errors/upstream_rejection_relayed",
            "Upstream 400 body is relayed with status 200",
            errors::test_upstream_rejection_relayed
        ),
        case!(
            WithKey,
            "errors/non_json_upstream",
            "Non-JSON upstream body yields 502",
            errors::test_non_json_upstream
        ),
        case!(
            WithKey,
            "errors/malformed_body_rejected",
            "Malformed inbound JSON yields 400 without an upstream call",
            errors::test_malformed_body_rejected
        ),
        case!(
            WithKey,
            "errors/no_key_leak",
            "Proxy error bodies never contain the API key",
            errors::test_errors_do_not_leak_key
        ),
        // Proxy started without GEMINI_API_KEY
        case!(
            WithoutKey,
            "unset_key/empty_key_sent",
            "Upstream is still called, with an empty key parameter",
            generate::test_api_key_forwarded
        ),
        case!(
            WithoutKey,
            "unset_key/rejection_relayed",
            "Gemini's invalid-key error reaches the caller unchanged",
            errors::test_invalid_key_rejection_relayed
        ),
        // Routing and CORS
        case!(WithKey, "server/health", "/health returns OK", server::test_health),
        case!(
            WithKey,
            "server/cors_preflight",
            "CORS preflight allows any origin",
            server::test_cors_preflight
        ),
        case!(
            WithKey,
            "server/generate_post_only",
            "GET /generate is rejected with 405",
            server::test_generate_is_post_only
        ),
    ]
}
