use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use maxminddb::{geoip2, MaxMindDBError};

use folio_core::geo::{
    is_local_address, GeoLocator, StaticGeoLocator, LOCAL_LOCATION, UNKNOWN_LOCATION,
};

/// Country lookup against a MaxMind (or DB-IP) `.mmdb` file.
///
/// Yields the ISO 3166-1 alpha-2 code, `Local` for private ranges, and
/// `Unknown` when the address is absent from the database.
pub struct MaxMindGeoLocator {
    reader: maxminddb::Reader<Vec<u8>>,
}

impl MaxMindGeoLocator {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let reader = maxminddb::Reader::open_readfile(path)?;
        Ok(Self { reader })
    }
}

impl GeoLocator for MaxMindGeoLocator {
    fn locate(&self, ip: &str) -> String {
        if is_local_address(ip) {
            return LOCAL_LOCATION.to_string();
        }
        let Ok(addr) = ip.trim().parse::<IpAddr>() else {
            return UNKNOWN_LOCATION.to_string();
        };

        country_code(ip, self.reader.lookup::<geoip2::Country>(addr))
    }
}

/// ISO code from a country lookup, or `Unknown` when the address or its
/// country is missing.
fn country_code(ip: &str, lookup: Result<geoip2::Country<'_>, MaxMindDBError>) -> String {
    match lookup {
        Ok(record) => record
            .country
            .and_then(|c| c.iso_code)
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        Err(MaxMindDBError::AddressNotFoundError(_)) => UNKNOWN_LOCATION.to_string(),
        Err(e) => {
            tracing::debug!(ip, error = %e, "GeoIP lookup failed");
            UNKNOWN_LOCATION.to_string()
        }
    }
}

/// MaxMind locator when `path` opens, otherwise the static locator.
///
/// A missing database is not fatal: visits are stored with `Unknown`/`Local`.
pub fn locator_from_path(path: &str) -> Arc<dyn GeoLocator> {
    if !Path::new(path).exists() {
        tracing::warn!(
            geoip_path = %path,
            "GeoIP database not found. Visits are stored with location Unknown."
        );
        return Arc::new(StaticGeoLocator);
    }
    match MaxMindGeoLocator::open(path) {
        Ok(locator) => {
            tracing::info!(geoip_path = %path, "GeoIP database loaded");
            Arc::new(locator)
        }
        Err(e) => {
            tracing::warn!(geoip_path = %path, error = %e, "GeoIP database unreadable");
            Arc::new(StaticGeoLocator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_record_yields_iso_code() {
        let record: geoip2::Country<'_> =
            serde_json::from_str(r#"{"country":{"iso_code":"DE","geoname_id":2921044}}"#)
                .expect("country record");
        assert_eq!(country_code("203.0.113.7", Ok(record)), "DE");
    }

    #[test]
    fn record_without_country_is_unknown() {
        let record: geoip2::Country<'_> = serde_json::from_str("{}").expect("country record");
        assert_eq!(country_code("203.0.113.7", Ok(record)), "Unknown");
    }

    #[test]
    fn lookup_errors_are_unknown() {
        let not_found = MaxMindDBError::AddressNotFoundError("no record".to_string());
        assert_eq!(country_code("203.0.113.7", Err(not_found)), "Unknown");
        let corrupt = MaxMindDBError::InvalidDatabaseError("bad tree".to_string());
        assert_eq!(country_code("203.0.113.7", Err(corrupt)), "Unknown");
    }

    #[test]
    fn missing_database_falls_back_to_static_locator() {
        let locator = locator_from_path("/nonexistent/GeoLite2-Country.mmdb");
        assert_eq!(locator.locate("127.0.0.1"), "Local");
        assert_eq!(locator.locate("8.8.8.8"), "Unknown");
    }

    #[test]
    fn unreadable_database_falls_back_to_static_locator() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        std::fs::write(file.path(), b"definitely not an mmdb").expect("write");
        let path = file.path().to_string_lossy().to_string();
        let locator = locator_from_path(&path);
        assert_eq!(locator.locate("8.8.8.8"), "Unknown");
    }
}
