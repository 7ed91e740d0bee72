use crate::WalletSession;
use dwat_types::Route;

/// Whether `route` may be shown for `session` right now.
pub fn can_enter(route: Route, session: &WalletSession) -> bool {
    route != Route::Presale || session.is_connected()
}

/// Where a navigation to `requested` actually lands.
///
/// The presale page needs a connected account and sends everyone else to the
/// wallet picker; the wallet picker forwards connected visitors to the sale.
/// Evaluate on every navigation; the session can change between them.
pub fn resolve_route(requested: Route, session: &WalletSession) -> Route {
    match requested {
        Route::Presale if !can_enter(Route::Presale, session) => Route::WalletConnect,
        Route::WalletConnect if session.is_connected() => Route::Presale,
        other => other,
    }
}
