//! Server scaffold: health route and open CORS

use crate::runner::TestContext;

use super::helpers::assert_true;

/// /health is answered by the proxy itself with plain "OK"
pub async fn test_health(ctx: TestContext) -> anyhow::Result<()> {
    let resp = ctx.proxy.get("/health").await?;

    assert_true(resp.status == 200, &format!("Expected 200, got {}", resp.status))?;
    assert_true(
        resp.raw_body.trim() == "OK",
        &format!("Expected proxy health to return 'OK', got: {:?}", resp.raw_body),
    )?;

    Ok(())
}

/// CORS preflight from any origin is allowed
pub async fn test_cors_preflight(ctx: TestContext) -> anyhow::Result<()> {
    let resp = ctx.proxy.preflight("https://some-frontend.example").await?;

    assert_true(resp.status == 200, &format!("Expected 200 for preflight, got {}", resp.status))?;

    let allow_origin = resp.header("access-control-allow-origin");
    assert_true(
        allow_origin == Some("*"),
        &format!("Expected access-control-allow-origin: *, got {:?}", allow_origin),
    )?;

    Ok(())
}

/// GET /generate is not routed
pub async fn test_generate_is_post_only(ctx: TestContext) -> anyhow::Result<()> {
    let resp = ctx.proxy.get("/generate").await?;

    assert_true(resp.status == 405, &format!("Expected 405, got {}", resp.status))?;

    Ok(())
}
