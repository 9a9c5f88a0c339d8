//! The `appinfra` module: site network allocation.

use crate::address::{AddressError, AddressValue};
use crate::graph::{ObjectGraph, ObjectId, Site};

/// Prefix length of the block each site receives by default.
pub const SITE_PREFIX_LENGTH: u8 = 21;

/// Errors from [`calc_site_network`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteNetworkError {
    /// The site's `app_service` handle does not name an `appinfra::AppService`.
    #[error("site '{site}' refers to object {handle}, which is not an appinfra::AppService")]
    NotAnAppService { site: String, handle: ObjectId },
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// The subnet owned by `site` inside the network of the service it refers to.
///
/// Sites are laid out back to back from the service's base address, one
/// `/site_prefix_length` block per `site_index`. Fails with
/// [`AddressError::OutOfRange`] once the index runs past the service network.
pub fn calc_site_network(
    graph: &ObjectGraph,
    site: &Site,
    site_prefix_length: u8,
) -> Result<AddressValue, SiteNetworkError> {
    let service =
        graph
            .app_service(site.app_service)
            .ok_or_else(|| SiteNetworkError::NotAnAppService {
                site: site.name.clone(),
                handle: site.app_service,
            })?;
    let network = service
        .network_address
        .subdivide(site.site_index, site_prefix_length)?;
    tracing::trace!(site = %site.name, index = site.site_index, %network, "site network");
    Ok(network)
}
