//! Example: binding a form and scripting it

use bunny_dom::Document;
use bunny_forms::{Forms, SubmitOptions};
use bunny_net::MockTransport;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Build a small document with one form
    let mut dom = Document::new();
    let form = dom.append_form("signup").unwrap();
    dom.set_attribute(form, "action", "https://example.com/signup").unwrap();
    dom.append_input(form, "text", "email", "").unwrap();
    dom.append_input(form, "checkbox", "color", "red").unwrap();
    dom.append_input(form, "checkbox", "color", "blue").unwrap();

    // Bind it and script some values
    let mut forms = Forms::new();
    forms.init(&mut dom, "signup").unwrap();
    forms.set(&mut dom, "signup", "email", "bun@example.com").unwrap();
    forms.set_checked(&mut dom, "signup", "color", "red", true).unwrap();
    forms.set_checked(&mut dom, "signup", "color", "blue", true).unwrap();

    println!("model: {}", forms.values("signup").unwrap().to_json());

    // Submit through a canned transport
    let transport = MockTransport::with_response(200, "welcome aboard");
    let reply = smol::block_on(forms.submit(
        &dom,
        "signup",
        SubmitOptions::new(),
        &transport,
    ))
    .unwrap();
    println!("server said: {reply}");
}
