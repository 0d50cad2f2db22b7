//! WMS `GetFeatureInfo` raster point queries.

use async_trait::async_trait;
use mapscope_core::ServiceError;
use mapscope_map::{RasterInfoRequest, RasterInfoService};

use crate::http::{join_numbers, run_blocking, HttpClient};

const SERVICE: &str = "wms";

/// Size of the virtual map image the query is made against, in pixels.
pub const INFO_IMAGE_SIZE: u32 = 101;

/// Maximum features reported per query.
pub const FEATURE_COUNT: u32 = 5;

/// Builds a WMS 1.3.0 `GetFeatureInfo` URL.
///
/// The request describes a 101 x 101 pixel image centered on the clicked
/// coordinate at the current resolution, and asks for the center pixel.
pub fn feature_info_url(request: &RasterInfoRequest) -> String {
    let half = request.resolution * f64::from(INFO_IMAGE_SIZE) / 2.0;
    let c = request.coordinate;
    let bbox = join_numbers(&[c.x - half, c.y - half, c.x + half, c.y + half]);
    let pixel = INFO_IMAGE_SIZE / 2;
    let separator = if request.url.contains('?') { '&' } else { '?' };
    format!(
        "{url}{sep}SERVICE=WMS&VERSION=1.3.0&REQUEST=GetFeatureInfo&FORMAT=image/png\
         &TRANSPARENT=true&QUERY_LAYERS={layer}&LAYERS={layer}&INFO_FORMAT=text/plain\
         &FEATURE_COUNT={count}&I={px}&J={px}&WIDTH={size}&HEIGHT={size}&CRS=EPSG:3857\
         &STYLES=&BBOX={bbox}",
        url = request.url,
        sep = separator,
        layer = request.layer_name,
        count = FEATURE_COUNT,
        px = pixel,
        size = INFO_IMAGE_SIZE,
        bbox = bbox,
    )
}

/// Raster info over WMS.
#[derive(Debug, Clone, Default)]
pub struct WmsRasterInfoService {
    client: HttpClient,
}

impl WmsRasterInfoService {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RasterInfoService for WmsRasterInfoService {
    async fn feature_info(&self, request: &RasterInfoRequest) -> Result<String, ServiceError> {
        let url = feature_info_url(request);
        let client = self.client.clone();
        let text = run_blocking(SERVICE, move || client.get_text(SERVICE, &url)).await?;
        Ok(text.trim().to_string())
    }
}
