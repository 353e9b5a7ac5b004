//! 页面骨架与静态片段

use crate::app::catalog::PRODUCTS_PATH;
use crate::views::feature_list::{render_state, ListState};

const STYLE: &str = r#"
body { margin: 0; font-family: Arial, sans-serif; background: #f9fafb; color: #111827; }
.banner { color: white; padding: 80px 16px; text-align: center; }
.banner h1 { font-size: 48px; margin: 0; }
.banner.hero { background: linear-gradient(to right, #2563eb, #4338ca); }
.banner.products { background: linear-gradient(to right, #9333ea, #be185d); }
.banner.about { background: linear-gradient(to right, #16a34a, #0f766e); }
.banner a { display: inline-block; margin: 40px 8px 0; padding: 12px 32px; border-radius: 8px; border: 2px solid white; color: white; text-decoration: none; }
.feature-list { max-width: 1280px; margin: 0 auto; padding: 48px 16px; text-align: center; }
.feature-list.loading { color: #6b7280; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 32px; margin-top: 40px; }
.card { background: #f3f4f6; border-radius: 8px; padding: 24px; text-align: left; }
.price { font-weight: bold; color: #4f46e5; }
.heavy-component { background: #fef2f2; border-top: 4px solid #ef4444; padding: 48px 16px; }
.heavy-component .grid { grid-template-columns: repeat(6, 1fr); gap: 8px; }
.heavy-item { font-size: 12px; background: white; padding: 8px; }
.heavy-client { padding: 10px; background: #ffebee; border: 1px solid red; font-size: 12px; }
.content { max-width: 1280px; margin: 0 auto; padding: 48px 16px; background: white; min-height: 400px; }
footer { background: #1f2937; color: #9ca3af; padding: 48px 16px; display: flex; justify-content: space-between; }
footer a { color: #9ca3af; margin-left: 24px; }
"#;

/// 页面加载后请求模拟数据接口，用卡片模板渲染列表；失败时换成空列表，不显示错误
const HYDRATE_SCRIPT: &str = r#"
(function () {
  var slot = document.getElementById('feature-list');
  var shell = document.getElementById('feature-list-empty');
  var card = document.getElementById('feature-card');
  if (!slot || !shell || !card) { return; }
  function show(products) {
    var list = shell.content.cloneNode(true);
    var grid = list.querySelector('.grid');
    products.forEach(function (p) {
      var item = card.content.cloneNode(true);
      item.firstElementChild.setAttribute('data-id', p.id);
      item.querySelector('[data-field="name"]').textContent = p.name;
      item.querySelector('[data-field="description"]').textContent = p.description;
      item.querySelector('[data-field="price"]').textContent = '$' + p.price;
      grid.appendChild(item);
    });
    slot.replaceChildren(list);
  }
  fetch(slot.dataset.source)
    .then(function (res) { if (!res.ok) { throw new Error('HTTP ' + res.status); } return res.json(); })
    .then(function (data) { if (!Array.isArray(data)) { throw new Error('unexpected payload'); } show(data); })
    .catch(function (err) {
      console.error('Failed to fetch products:', err);
      show([]);
    });
})();
"#;

/// 页面上产品列表挂载点的 id
pub const FEATURE_LIST_SLOT_ID: &str = "feature-list";

const CARD_TEMPLATE: &str = r#"<div class="card"><h3 data-field="name"></h3><p data-field="description"></p><p class="price" data-field="price"></p></div>"#;

/// 完整 HTML 文档
pub fn document(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
<style>{}</style>
</head>
<body>
<main>
{}
{}
</main>
</body>
</html>"#,
        title,
        STYLE,
        body,
        footer()
    )
}

pub fn hero() -> String {
    r#"<div class="banner hero">
  <h1>Performance Thesis Testbed</h1>
  <p>A modern web application built for measuring performance regression.</p>
  <a href="/products">View Products</a>
  <a href="/about">About Us</a>
</div>"#
        .to_string()
}

pub fn banner(class: &str, title: &str) -> String {
    format!(
        r#"<div class="banner {}"><h1>{}</h1></div>"#,
        class, title
    )
}

pub fn footer() -> String {
    r##"<footer>
  <p>&copy; 2026 Performance Thesis. All rights reserved.</p>
  <div><a href="#">Privacy</a><a href="#">Terms</a></div>
</footer>"##
        .to_string()
}

/// 列表区域：首屏为加载占位，由脚本请求接口后换成真实内容
pub fn feature_list_section() -> String {
    format!(
        r#"<section id="{}" data-source="{}">{}</section>
<template id="feature-list-empty">{}</template>
<template id="feature-card">{}</template>
<script>{}</script>"#,
        FEATURE_LIST_SLOT_ID,
        PRODUCTS_PATH,
        render_state(&ListState::Loading),
        render_state(&ListState::Loaded(Vec::new())),
        CARD_TEMPLATE,
        HYDRATE_SCRIPT
    )
}

pub fn about_content() -> String {
    r#"<div class="content">
  <h2>Our Mission</h2>
  <p>We are dedicated to building high-performance web applications and rigorously testing them against regressions.
  This page is intentionally lightweight and static to serve as a control group for performance testing.</p>
</div>"#
        .to_string()
}
