const ARTWORK_HOST: &str = "https://f4.bcbits.com";
const ART_ID_WIDTH: usize = 10;

/// Image URL for an `art_id`. Ids are zero-padded to ten digits; longer ids
/// are used unchanged.
pub fn artwork_url(art_id: Option<&str>) -> Option<String> {
    let art_id = art_id?;
    Some(format!(
        "{}/img/a{:0>width$}_9.jpg",
        ARTWORK_HOST,
        art_id,
        width = ART_ID_WIDTH
    ))
}
