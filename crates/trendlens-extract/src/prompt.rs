//! Prompt construction for the extraction call.
//!
//! The system prompt carries the extraction rules, the filtered catalog
//! excerpt as a style/trend reference, and season/category directives. The
//! user prompt carries the target URL, its origin for resolving relative
//! image paths, and the sanitized markup.

use trendlens_core::catalog::CatalogEntry;

/// The model is asked for more products than the page cap so that items lost
/// to image validation still leave a full page.
pub const REQUESTED_PRODUCT_RANGE: (usize, usize) = (12, 15);

#[must_use]
pub fn build_system_prompt(catalog: &[CatalogEntry], season: &str, categories: &str) -> String {
    let (min, max) = REQUESTED_PRODUCT_RANGE;

    let references = if catalog.is_empty() {
        "(no reference products for this selection)".to_string()
    } else {
        catalog
            .iter()
            .map(|e| format!("- {} — {} [score: {}/10]", e.titulo, e.notas, e.trend_score))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut prompt = format!(
        "You are an e-commerce analyst specialized in women's fashion trends.\n\
         \n\
         Task: extract between {min} and {max} REAL women's clothing products from the \
         provided page markup. Extract extra products to compensate for image URLs that \
         may turn out to be unreachable.\n\
         \n\
         REFERENCE PRODUCTS (use as a style and trend guide):\n\
         {references}\n\
         \n\
         Reply with ONLY this JSON shape, no markdown fences:\n\
         {{\n\
           \"url\": \"analyzed-url\",\n\
           \"products\": [\n\
             {{\n\
               \"title\": \"Exact product name\",\n\
               \"price\": \"$XXX.XX\",\n\
               \"colors\": [\"color1\", \"color2\"],\n\
               \"sizes\": [\"S\", \"M\", \"L\"],\n\
               \"image\": \"https://domain.com/full/path/image.jpg\",\n\
               \"trend_score\": 8.5,\n\
               \"recommendation\": \"Why this product is trending\"\n\
             }}\n\
           ]\n\
         }}\n\
         \n\
         Strict rules:\n\
         - Women's clothing only: dresses, blouses, pants, skirts, tops, sweaters, jackets.\n\
         - Title, price, and image are mandatory; omit the product if any is missing.\n\
         - Image URLs must be absolute; resolve relative paths against the base URL.\n\
         - Colors and sizes: extract when visible, otherwise use [].\n\
         - trend_score: 1-10 based on modernity, quality, and alignment with the references.\n\
         - No accessories, shoes, bags, or jewelry.\n\
         - Never invent image URLs.\n\
         - Do not repeat near-identical products.\n"
    );

    if let Some(directive) = season_directive(season) {
        prompt.push('\n');
        prompt.push_str(directive);
        prompt.push('\n');
    }
    if let Some(directive) = category_directive(categories) {
        prompt.push('\n');
        prompt.push_str(directive);
        prompt.push('\n');
    }
    if season == "todos" && categories == "todos" {
        prompt.push_str(
            "\nEVERYTHING: pick the best of the store, with variety across styles and seasons.\n",
        );
    }

    prompt
}

#[must_use]
pub fn build_user_prompt(
    url: &str,
    base_url: &str,
    sanitized_markup: &str,
    season: &str,
    categories: &str,
) -> String {
    let season_label = match season {
        "caliente" => "WARM WEATHER",
        "frio" => "COLD WEATHER",
        _ => "ALL SEASONS",
    };

    format!(
        "Analyze this store page and extract the products.\n\
         \n\
         SEASON: {season_label}\n\
         CATEGORY: {}\n\
         \n\
         URL: {url}\n\
         Base URL: {base_url}\n\
         HTML:\n\
         {sanitized_markup}",
        categories.to_uppercase()
    )
}

fn season_directive(season: &str) -> Option<&'static str> {
    match season {
        "caliente" => Some(
            "WARM WEATHER: focus on light, fresh, breathable garments, sleeveless or short \
             sleeves, light colors.",
        ),
        "frio" => Some(
            "COLD WEATHER: prioritize sweaters, long sleeves, jackets, coats, layers, heavy \
             knits.",
        ),
        _ => None,
    }
}

fn category_directive(categories: &str) -> Option<&'static str> {
    match categories {
        "vacaciones" => Some(
            "VACATION: beach dresses, sarongs, kaftans, cover-ups, resort wear, tropical \
             prints, casual beach looks.",
        ),
        "tejidos" => Some(
            "KNITS: sweaters, cardigans, knit dresses, knit tops, artisanal textures.",
        ),
        "tops" => Some("TOPS: blouses, shirts, crop tops, bodysuits, casual and dressy tops."),
        "vestidos" => Some(
            "DRESSES: every style - casual, elegant, midi, maxi, mini, printed or plain.",
        ),
        "pantalones" => Some("PANTS: jeans, leggings, palazzo, cargo, dressy, casual."),
        "conjuntos" => Some("SETS: 2-3 piece coordinates, matching sets, complete outfits."),
        _ => None,
    }
}
