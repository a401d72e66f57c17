/// Renders the single page of the app. Sections for the uploaded image, the
/// predicted stage, and an error line are emitted only when present.
pub fn render(image_src: Option<&str>, prediction: Option<&str>, error: Option<&str>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
             <title>Liver Fibrosis Detection</title>\n\
         </head>\n\
         <body>\n\
             <h2>Liver Fibrosis Stage Prediction</h2>\n\
             <form method=\"POST\" enctype=\"multipart/form-data\">\n\
                 <input type=\"file\" name=\"image\" accept=\"image/*\" required>\n\
                 <input type=\"submit\" value=\"Predict\">\n\
             </form>\n",
    );

    if let Some(message) = error {
        html.push_str(&format!("    <p class=\"error\">{}</p>\n", message));
    }
    if let Some(src) = image_src {
        html.push_str(&format!(
            "    <h3>Uploaded Image:</h3>\n    <img src=\"{}\" width=\"300\">\n",
            src
        ));
    }
    if let Some(stage) = prediction {
        html.push_str(&format!("    <h2>Predicted Stage: {}</h2>\n", stage));
    }

    html.push_str("</body>\n</html>\n");
    html
}
