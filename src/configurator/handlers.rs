//! Handlers for the `proxy.*` directives.

use std::path::Path;

use crate::config::ConfigNode;
use crate::configurator::directive::{Directive, DirectiveContext, Levels};
use crate::configurator::error::ConfigureError;
use crate::configurator::registry::DirectiveRegistry;
use crate::configurator::scan;
use crate::configurator::sink::ProxyTarget;
use crate::tls::VerifyMode;

pub const REVERSE_URL: &str = "proxy.reverse.url";
pub const PRESERVE_HOST: &str = "proxy.preserve-host";
pub const TIMEOUT_IO: &str = "proxy.timeout.io";
pub const TIMEOUT_KEEPALIVE: &str = "proxy.timeout.keepalive";
pub const WEBSOCKET: &str = "proxy.websocket";
pub const WEBSOCKET_TIMEOUT: &str = "proxy.websocket.timeout";
pub const SSL_VERIFY_PEER: &str = "proxy.ssl.verify-peer";
pub const SSL_CAFILE: &str = "proxy.ssl.cafile";

/// Register every proxy directive.
pub fn register_proxy_directives(registry: &mut DirectiveRegistry) {
    registry
        .register(
            Directive::scalar(REVERSE_URL, on_reverse_url)
                .levels(Levels::PATH)
                .deferred(),
        )
        .register(Directive::scalar(PRESERVE_HOST, on_preserve_host))
        .register(Directive::scalar(TIMEOUT_IO, on_timeout_io))
        .register(Directive::scalar(TIMEOUT_KEEPALIVE, on_timeout_keepalive))
        .register(Directive::scalar(WEBSOCKET, on_websocket))
        .register(Directive::scalar(WEBSOCKET_TIMEOUT, on_websocket_timeout))
        .register(Directive::scalar(SSL_VERIFY_PEER, on_ssl_verify_peer))
        .register(Directive::scalar(SSL_CAFILE, on_ssl_cafile));
}

fn on_timeout_io(ctx: &mut DirectiveContext<'_>, node: &ConfigNode) -> Result<(), ConfigureError> {
    ctx.vars.io_timeout = scan::parse_millis(TIMEOUT_IO, node)?;
    Ok(())
}

fn on_timeout_keepalive(ctx: &mut DirectiveContext<'_>, node: &ConfigNode) -> Result<(), ConfigureError> {
    ctx.vars.keepalive_timeout = scan::parse_millis(TIMEOUT_KEEPALIVE, node)?;
    Ok(())
}

fn on_preserve_host(ctx: &mut DirectiveContext<'_>, node: &ConfigNode) -> Result<(), ConfigureError> {
    ctx.vars.preserve_host = scan::on_off(PRESERVE_HOST, node)?;
    Ok(())
}

fn on_websocket(ctx: &mut DirectiveContext<'_>, node: &ConfigNode) -> Result<(), ConfigureError> {
    ctx.vars.websocket.enabled = scan::on_off(WEBSOCKET, node)?;
    Ok(())
}

fn on_websocket_timeout(ctx: &mut DirectiveContext<'_>, node: &ConfigNode) -> Result<(), ConfigureError> {
    ctx.vars.websocket.timeout = scan::parse_millis(WEBSOCKET_TIMEOUT, node)?;
    Ok(())
}

fn on_ssl_verify_peer(ctx: &mut DirectiveContext<'_>, node: &ConfigNode) -> Result<(), ConfigureError> {
    let mode = if scan::on_off(SSL_VERIFY_PEER, node)? {
        VerifyMode::Peer
    } else {
        VerifyMode::None
    };
    ctx.vars.tls.make_exclusive().set_verify_mode(mode);
    Ok(())
}

fn on_ssl_cafile(ctx: &mut DirectiveContext<'_>, node: &ConfigNode) -> Result<(), ConfigureError> {
    let file = scan::scalar(SSL_CAFILE, node)?;
    ctx.vars
        .tls
        .replace_store_from_file(Path::new(file))
        .map_err(|e| ConfigureError::CertificateLoad {
            path: e.path,
            reason: e.reason,
            location: node.location.clone(),
        })
}

fn on_reverse_url(ctx: &mut DirectiveContext<'_>, node: &ConfigNode) -> Result<(), ConfigureError> {
    let url = scan::scalar(REVERSE_URL, node)?;
    let target = ProxyTarget::parse(url).map_err(|e| ConfigureError::TargetUrlParse {
        url: url.to_string(),
        reason: e.to_string(),
        location: node.location.clone(),
    })?;
    ctx.register_reverse_proxy(target);
    Ok(())
}
