//! Shared page wrapper for the layouts.

/// Wrap rendered body markup in a standalone, print-friendly HTML document.
pub(crate) fn page(title: &str, accent: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  :root {{ --accent: {accent}; }}
  * {{ box-sizing: border-box; }}
  body {{ margin: 0; background: #f3f4f6; font-family: Helvetica, Arial, sans-serif; color: #1f2937; }}
  .page {{ max-width: 800px; margin: 24px auto; background: #fff; padding: 40px; }}
  h1, h2, h3 {{ margin: 0; }}
  .accent {{ color: var(--accent); }}
  .accent-bg {{ background: var(--accent); color: #fff; }}
  .muted {{ color: #6b7280; }}
  .row {{ display: flex; justify-content: space-between; gap: 24px; }}
  .section {{ margin-top: 32px; }}
  table.items {{ width: 100%; border-collapse: collapse; margin-top: 8px; }}
  table.items th {{ text-align: left; font-size: 12px; text-transform: uppercase; color: #6b7280; padding: 8px; border-bottom: 2px solid var(--accent); }}
  table.items td {{ padding: 8px; border-bottom: 1px solid #e5e7eb; vertical-align: top; }}
  table.items .num {{ text-align: right; white-space: nowrap; }}
  .totals {{ margin-left: auto; margin-top: 16px; min-width: 260px; }}
  .totals div {{ display: flex; justify-content: space-between; padding: 4px 8px; }}
  .totals .grand {{ border-top: 2px solid var(--accent); font-weight: bold; margin-top: 4px; }}
  .logo {{ max-width: 140px; max-height: 100px; object-fit: contain; }}
  .signature img {{ max-height: 80px; }}
  @media print {{ body {{ background: #fff; }} .page {{ margin: 0; }} }}
</style>
</head>
<body>
<div class="page">
{body}
</div>
</body>
</html>
"#
    )
}
