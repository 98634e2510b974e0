// Prompt construction for listing copy.

use super::parse::REFUSAL_SENTINEL;

/// Build the copywriting prompt for a listing.
///
/// The model is asked for a bare JSON object so parse_copy() can read it,
/// and told to answer with the refusal sentinel for prohibited items.
pub fn build_prompt(keywords: &str, category: &str, with_image: bool) -> String {
    let image_line = if with_image {
        "A photo of the item is attached; use it to describe what is visible.\n"
    } else {
        ""
    };

    format!(
        "You write listings for a student campus marketplace where students sell or donate \
         items to each other.\n\
         Category: {category}\n\
         Seller's keywords: {keywords}\n\
         {image_line}\n\
         Write a short, honest title (at most 60 characters) and a friendly description of \
         2 to 4 sentences. Do not invent defects, prices, or brand names the seller did not \
         mention.\n\n\
         If the item is a weapon, drug, alcohol, stolen or counterfeit good, academic \
         dishonesty service, or otherwise violates campus policy, do not write a listing. \
         Instead set the title to exactly \"{REFUSAL_SENTINEL}\" and put a one-sentence reason \
         in the description.\n\n\
         Respond with only a JSON object of the form \
         {{\"title\": \"...\", \"description\": \"...\"}}.",
        category = category.trim(),
        keywords = keywords.trim(),
    )
}
