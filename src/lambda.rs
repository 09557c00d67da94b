#[cfg(feature = "lambda")]
use kidgrowth_advice::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use kidgrowth_advice::{AdviceHandler, AppConfig, GatewayClient};
#[cfg(feature = "lambda")]
use lambda_http::{run, service_fn, Body, Error, Request, Response};

#[cfg(feature = "lambda")]
async fn function_handler(
    handler: &AdviceHandler<GatewayClient>,
    event: Request,
) -> Result<Response<Body>, Error> {
    let resp = handler.handle(event.method(), event.body().as_ref()).await;

    Ok(resp.map(|body| {
        if body.is_empty() {
            Body::Empty
        } else {
            Body::Text(body)
        }
    }))
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    // Loaded once per cold start; a missing API key is reported per request.
    let config = AppConfig::load(None)?;
    config.validate()?;

    let handler = AdviceHandler::new(GatewayClient::new(&config.gateway))
        .with_error_detail(config.expose_error_detail);
    tracing::info!("growth-assistant ready (model {})", handler.gateway().model());

    let handler = &handler;
    run(service_fn(move |event: Request| async move {
        function_handler(handler, event).await
    }))
    .await
}
