//! Example: basic usage of sprig

use sprig::{EventType, Page, RequestConfig};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let page = Page::from_html(
        "<body>\
           <ul id=\"todo\"><li>write docs</li><li>ship it</li></ul>\
           <button>done</button>\
         </body>",
    );

    // traversal returns a new selection; mutation chains on the same one
    page.select("li")
        .css("color", "green")
        .toggle_class("done");

    let list = page.select("li").parent(None);
    println!("list id: {:?}", list.attr("id"));

    let clicks = page
        .select("button")
        .on_click(|event| println!("clicked node {:?}", event.target));
    clicks.trigger(EventType::Click);

    println!("{}", page.html());

    // fire-and-forget request; completion lands on the executor
    sprig::ajax(
        RequestConfig::new("http://127.0.0.1:8000/ping")
            .method("post")
            .data(&serde_json::json!({"ok": true}))
            .on_success(|body| println!("success: {body}"))
            .on_fail(|body| println!("fail: {body}")),
    );
}
