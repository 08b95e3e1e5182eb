/// The two confirmation pages shown to the browser at the end of the flow.
/// Their content is opaque to the server.
#[derive(Debug, Clone, Copy)]
pub struct Pages {
    pub success: &'static [u8],
    pub error: &'static [u8],
}

impl Pages {
    pub fn new(success: &'static [u8], error: &'static [u8]) -> Self {
        Self { success, error }
    }
}

impl Default for Pages {
    fn default() -> Self {
        Self::new(SUCCESS_PAGE.as_bytes(), ERROR_PAGE.as_bytes())
    }
}

pub const SUCCESS_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Authorization successful</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            background: #f4f7f6;
            color: #2d3436;
        }
        .card {
            text-align: center;
            padding: 2.5rem 3rem;
            background: #ffffff;
            border-radius: 12px;
            box-shadow: 0 4px 20px rgba(0, 0, 0, 0.08);
        }
        h1 { color: #27ae60; margin-top: 0; }
    </style>
</head>
<body>
    <div class="card">
        <h1>Authorization successful</h1>
        <p>stepikctl received your access token. You can close this tab and return to the terminal.</p>
    </div>
</body>
</html>
"#;

pub const ERROR_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Authorization failed</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            background: #f7f4f4;
            color: #2d3436;
        }
        .card {
            text-align: center;
            padding: 2.5rem 3rem;
            background: #ffffff;
            border-radius: 12px;
            box-shadow: 0 4px 20px rgba(0, 0, 0, 0.08);
        }
        h1 { color: #c0392b; margin-top: 0; }
    </style>
</head>
<body>
    <div class="card">
        <h1>Authorization failed</h1>
        <p>Access was denied or the token exchange did not succeed. Check the terminal for details and try again.</p>
    </div>
</body>
</html>
"#;
