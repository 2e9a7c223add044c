//! Submission and remote file loading.
//!
//! Forms go out as multipart/form-data over a pluggable [`Transport`].
//! A 200 resolves to the response body; anything else rejects with the
//! raw response so callers can inspect status and body themselves.

use bunny_dom::Document;
use bunny_file::{Blob, File};
use bunny_net::{Method, Part, Request, Transport, download, encode_multipart};
use tracing::info;

use crate::error::FormError;
use crate::facade::{FieldInput, Forms};
use crate::kind::ControlKind;
use crate::values::{FieldValue, FormValues};

/// Submission configuration.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Explicit target, overriding the form's `action` attribute
    pub url: Option<String>,
    pub method: Method,
    /// Extra headers sent with the request
    pub headers: Vec<(String, String)>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            url: None,
            method: Method::Post,
            headers: vec![(
                "X-Requested-With".to_string(),
                "XMLHttpRequest".to_string(),
            )],
        }
    }
}

impl SubmitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Flatten a value model into multipart parts, sequences one part per
/// value, files as file parts.
pub fn form_parts(values: &FormValues) -> Vec<Part> {
    let mut parts = Vec::new();
    for (name, value) in values.entries() {
        match value {
            FieldValue::Text(s) => parts.push(Part::text(name, s)),
            FieldValue::Many(items) => {
                for item in items {
                    parts.push(Part::text(name, item));
                }
            }
            FieldValue::File(f) => parts.push(Part::file(name, f.name(), f.as_blob().clone())),
        }
    }
    parts
}

impl Forms {
    /// The multipart parts submit would send right now.
    pub fn form_data(&self, form_id: &str) -> Result<Vec<Part>, FormError> {
        Ok(form_parts(&self.registration(form_id)?.values))
    }

    /// Send the form as multipart/form-data.
    ///
    /// The target is the explicit option URL, else the form's `action`
    /// attribute, else empty.
    pub async fn submit(
        &self,
        dom: &Document,
        form_id: &str,
        options: SubmitOptions,
        transport: &dyn Transport,
    ) -> Result<String, FormError> {
        let registration = self.registration(form_id)?;
        let url = options
            .url
            .clone()
            .or_else(|| dom.attribute(registration.node, "action").map(str::to_string))
            .unwrap_or_default();

        let parts = form_parts(&registration.values);
        let (content_type, body) = encode_multipart(&parts);

        let mut request =
            Request::new(options.method, &url).with_header("Content-Type", &content_type);
        for (name, value) in &options.headers {
            request = request.with_header(name, value);
        }
        request = request.with_body(body);

        info!("submitting form '{}' to '{}' ({} parts)", form_id, url, parts.len());
        let response = transport.send(request).await?;
        if response.status == 200 {
            Ok(response.text()?)
        } else {
            Err(FormError::SubmitFailed(response))
        }
    }

    /// Download a URL into a file input. The model takes the blob as
    /// an auto-named file, one synthetic change goes out, and the blob
    /// is handed back.
    pub async fn set_file_from_url(
        &mut self,
        dom: &mut Document,
        form_id: &str,
        name: &str,
        url: &str,
        transport: &dyn Transport,
    ) -> Result<Blob, FormError> {
        let blob = download(transport, url).await?;
        self.set(
            dom,
            form_id,
            name,
            FieldInput::File(File::unnamed(blob.clone())),
        )?;
        Ok(blob)
    }

    /// Load every file input default through the transport. A file
    /// input declares a default by putting a URL in its `value`
    /// attribute.
    pub async fn load_default_files(
        &mut self,
        dom: &mut Document,
        form_id: &str,
        transport: &dyn Transport,
    ) -> Result<(), FormError> {
        for (name, url) in self.default_file_urls(dom, form_id)? {
            self.set_file_from_url(dom, form_id, &name, &url, transport)
                .await?;
        }
        Ok(())
    }

    /// File inputs whose `value` attribute carries a default URL.
    pub fn default_file_urls(
        &self,
        dom: &Document,
        form_id: &str,
    ) -> Result<Vec<(String, String)>, FormError> {
        let node = self.registration(form_id)?.node;
        let mut pending = Vec::new();
        for control in dom.form_controls(node) {
            if ControlKind::classify(dom, control) != Some(ControlKind::File) {
                continue;
            }
            let Some(name) = dom.control_name(control) else {
                continue;
            };
            match dom.attribute(control, "value") {
                Some(url) if !url.is_empty() => {
                    pending.push((name.to_string(), url.to_string()));
                }
                _ => {}
            }
        }
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use bunny_dom::Document;
    use bunny_file::{Blob, File};
    use bunny_net::{Method, MockTransport, Response};

    use super::SubmitOptions;
    use crate::error::FormError;
    use crate::facade::Forms;
    use crate::values::FieldValue;

    fn checkout_form(dom: &mut Document) -> (Forms, bunny_dom::NodeId) {
        let form = dom.append_form("checkout").unwrap();
        dom.set_attribute(form, "action", "https://shop.test/order").unwrap();
        dom.append_input(form, "text", "email", "a@b.c").unwrap();
        dom.append_input(form, "text", "qty", "2").unwrap();

        let mut forms = Forms::new();
        forms.init(dom, "checkout").unwrap();
        (forms, form)
    }

    #[test]
    fn submit_resolves_with_the_response_body() {
        let mut dom = Document::new();
        let (forms, _) = checkout_form(&mut dom);
        let mock = MockTransport::with_response(200, "order 17 accepted");

        let body = smol::block_on(forms.submit(
            &dom,
            "checkout",
            SubmitOptions::new().with_url("https://shop.test/submit"),
            &mock,
        ))
        .unwrap();
        assert_eq!(body, "order 17 accepted");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].url, "https://shop.test/submit");
    }

    #[test]
    fn submit_rejects_with_the_raw_response() {
        let mut dom = Document::new();
        let (forms, _) = checkout_form(&mut dom);
        let mock = MockTransport::with_response(500, "boom");

        let err = smol::block_on(forms.submit(&dom, "checkout", SubmitOptions::new(), &mock));
        match err {
            Err(FormError::SubmitFailed(response)) => {
                assert_eq!(response.status, 500);
                assert_eq!(response.text().unwrap(), "boom");
            }
            other => panic!("expected SubmitFailed, got {other:?}"),
        }
    }

    #[test]
    fn submit_sends_multipart_with_every_entry() {
        let mut dom = Document::new();
        let (mut forms, _) = checkout_form(&mut dom);
        let file = File::new(Blob::new(vec![1, 2, 3], "image/png"), "receipt.png");
        forms.append("checkout", "tag", "a").unwrap();
        forms.append("checkout", "tag", "b").unwrap();

        let photo_form = dom.form_by_id("checkout").unwrap();
        dom.append_input(photo_form, "file", "receipt", "").unwrap();
        forms.deliver_mutations(&mut dom).unwrap();
        forms.set(&mut dom, "checkout", "receipt", file).unwrap();

        let mock = MockTransport::with_response(200, "ok");
        smol::block_on(forms.submit(&dom, "checkout", SubmitOptions::new(), &mock)).unwrap();

        let request = &mock.requests()[0];
        let content_type = request.header("content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(request.header("x-requested-with"), Some("XMLHttpRequest"));

        let body = String::from_utf8_lossy(request.body.as_ref().unwrap());
        assert!(body.contains("name=\"email\""));
        assert!(body.contains("a@b.c"));
        // One part per sequence value
        assert_eq!(body.matches("name=\"tag\"").count(), 2);
        assert!(body.contains("filename=\"receipt.png\""));
        assert!(body.contains("Content-Type: image/png"));
    }

    #[test]
    fn submit_falls_back_to_the_action_attribute() {
        let mut dom = Document::new();
        let (forms, _) = checkout_form(&mut dom);
        let mock = MockTransport::with_response(200, "ok");

        smol::block_on(forms.submit(&dom, "checkout", SubmitOptions::new(), &mock)).unwrap();
        assert_eq!(mock.requests()[0].url, "https://shop.test/order");
    }

    #[test]
    fn submit_options_extend_method_and_headers() {
        let mut dom = Document::new();
        let (forms, _) = checkout_form(&mut dom);
        let mock = MockTransport::with_response(200, "ok");

        smol::block_on(forms.submit(
            &dom,
            "checkout",
            SubmitOptions::new()
                .with_method(Method::Put)
                .with_header("Authorization", "Bearer t"),
            &mock,
        ))
        .unwrap();

        let request = &mock.requests()[0];
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.header("authorization"), Some("Bearer t"));
        assert_eq!(request.header("x-requested-with"), Some("XMLHttpRequest"));
    }

    #[test]
    fn set_file_from_url_fills_the_model() {
        let mut dom = Document::new();
        let form = dom.append_form("up").unwrap();
        dom.append_input(form, "file", "photo", "").unwrap();

        let mut forms = Forms::new();
        forms.init(&mut dom, "up").unwrap();

        let mock = MockTransport::new();
        let mut response = Response::with_status(200, "pngbytes");
        response
            .headers
            .push(("Content-Type".to_string(), "image/png".to_string()));
        mock.push_response(response);

        let blob = smol::block_on(forms.set_file_from_url(
            &mut dom,
            "up",
            "photo",
            "https://cdn.test/default.png",
            &mock,
        ))
        .unwrap();
        assert_eq!(blob.mime_type(), "image/png");

        let entry = forms.get("up", "photo").unwrap().unwrap();
        let file = entry.as_file().unwrap();
        assert_eq!(file.name(), "blob");
        assert_eq!(file.as_bytes(), b"pngbytes");
        assert_eq!(dom.take_change_events().len(), 1);
    }

    #[test]
    fn load_default_files_walks_value_attributes() {
        let mut dom = Document::new();
        let form = dom.append_form("up").unwrap();
        dom.append_input(form, "file", "avatar", "https://cdn.test/a.png").unwrap();
        dom.append_input(form, "file", "banner", "").unwrap();

        let mut forms = Forms::new();
        forms.init(&mut dom, "up").unwrap();
        assert_eq!(
            forms.default_file_urls(&dom, "up").unwrap(),
            vec![("avatar".to_string(), "https://cdn.test/a.png".to_string())]
        );

        let mock = MockTransport::with_response(200, "imagebytes");
        smol::block_on(forms.load_default_files(&mut dom, "up", &mock)).unwrap();

        assert_eq!(mock.requests()[0].url, "https://cdn.test/a.png");
        let entry = forms.get("up", "avatar").unwrap().unwrap();
        assert_eq!(entry.as_file().unwrap().as_bytes(), b"imagebytes");
        // The untouched input keeps its blank entry
        assert_eq!(
            forms.get("up", "banner").unwrap(),
            Some(FieldValue::Text(String::new()))
        );
    }
}
