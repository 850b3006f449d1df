#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use std::cell::Cell;
    use test_log::test;
    use tokensmith::batch::{RenderBatch, Template};
    use tokensmith::context::{MediaInput, RenderContext, VideoStream};
    use tokensmith::error::{Error, Result};
    use tokensmith::prompt::PromptSource;

    fn mapping(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    struct RecordingSource {
        calls: Cell<usize>,
        answers: IndexMap<String, String>,
    }

    impl RecordingSource {
        fn new(pairs: &[(&str, &str)]) -> Self {
            Self { calls: Cell::new(0), answers: mapping(pairs) }
        }
    }

    impl PromptSource for RecordingSource {
        fn request(&self, names: &[String]) -> Result<IndexMap<String, String>> {
            self.calls.set(self.calls.get() + 1);
            Ok(names
                .iter()
                .filter_map(|n| self.answers.get(n).map(|v| (n.clone(), v.clone())))
                .collect())
        }
    }

    #[test]
    fn shared_prompt_across_grammars_is_asked_once() {
        let source = RecordingSource::new(&[("prompt_source", "Some Group")]);
        let outcome = RenderBatch::new()
            .provider(mapping(&[("title", "Coherence")]))
            .template(Template::flat("name", "{title}-{prompt_source}"))
            .template(Template::document("nfo", "Shared by {{ prompt_source }}"))
            .prompt_source(&source)
            .run()
            .unwrap();

        assert_eq!(source.calls.get(), 1);
        assert_eq!(
            outcome.get("name").unwrap().as_ref().unwrap(),
            "Coherence-Some Group"
        );
        assert_eq!(
            outcome.get("nfo").unwrap().as_ref().unwrap(),
            "Shared by Some Group"
        );
    }

    #[test]
    fn blank_prompt_answer_is_empty_not_an_error() {
        let source = RecordingSource::new(&[]);
        let outcome = RenderBatch::new()
            .template(Template::flat("t", "x{:opt=-:prompt_note:opt=-:}y"))
            .prompt_source(&source)
            .run()
            .unwrap();
        // the optional segment disappears entirely
        assert_eq!(outcome.get("t").unwrap().as_ref().unwrap(), "xy");
    }

    #[test]
    fn one_bad_template_does_not_abort_siblings() {
        let outcome = RenderBatch::new()
            .provider(mapping(&[("title", "Coherence")]))
            .template(Template::flat("ok", "{title}"))
            .template(Template::flat("broken", "{bad_token}"))
            .run()
            .unwrap();
        assert!(matches!(
            outcome.get("broken").unwrap(),
            Err(Error::UnknownToken { token }) if token == "bad_token"
        ));
        assert_eq!(outcome.get("ok").unwrap().as_ref().unwrap(), "Coherence");
    }

    #[test]
    fn document_syntax_error_is_per_template_with_line() {
        let outcome = RenderBatch::new()
            .template(Template::document("bad", "a\n{% if x %}\nno end"))
            .template(Template::document("good", "fine"))
            .run()
            .unwrap();
        assert!(matches!(
            outcome.get("bad").unwrap(),
            Err(Error::TemplateSyntax { line, .. }) if *line >= 2
        ));
        assert_eq!(outcome.get("good").unwrap().as_ref().unwrap(), "fine");
    }

    #[test]
    fn providers_merge_in_precedence_order() {
        let outcome = RenderBatch::new()
            .provider(mapping(&[("title", "guessed"), ("year", "2013")]))
            .provider(mapping(&[("title", "Coherence")]))
            .template(Template::flat("t", "{title} {year}"))
            .run()
            .unwrap();
        assert_eq!(outcome.get("t").unwrap().as_ref().unwrap(), "Coherence 2013");
    }

    #[test]
    fn user_constants_resolve_in_both_grammars() {
        let outcome = RenderBatch::new()
            .constant("usr_group", "GRP")
            .template(Template::flat("flat", "-{usr_group}"))
            .template(Template::document("doc", "group: {{ usr_group }}"))
            .run()
            .unwrap();
        assert_eq!(outcome.get("flat").unwrap().as_ref().unwrap(), "-GRP");
        assert_eq!(outcome.get("doc").unwrap().as_ref().unwrap(), "group: GRP");
    }

    #[test]
    fn conditional_prompt_is_skipped_when_controller_is_blank() {
        let source = RecordingSource::new(&[("prompt_repack_reason", "fixed audio")]);
        let outcome = RenderBatch::new()
            .provider(mapping(&[("repack", "")]))
            .condition("prompt_repack_reason", "repack")
            .template(Template::flat("t", "{:opt=(:prompt_repack_reason:opt=):}"))
            .prompt_source(&source)
            .run()
            .unwrap();
        assert_eq!(source.calls.get(), 0);
        assert_eq!(outcome.get("t").unwrap().as_ref().unwrap(), "");
    }

    #[test]
    fn conditional_prompt_fires_when_controller_is_set() {
        let source = RecordingSource::new(&[("prompt_repack_reason", "fixed audio")]);
        let outcome = RenderBatch::new()
            .provider(mapping(&[("repack", "REPACK")]))
            .condition("prompt_repack_reason", "repack")
            .template(Template::flat("t", "{prompt_repack_reason}"))
            .prompt_source(&source)
            .run()
            .unwrap();
        assert_eq!(source.calls.get(), 1);
        assert_eq!(outcome.get("t").unwrap().as_ref().unwrap(), "fixed audio");
    }

    #[test]
    fn cancelled_request_aborts_before_any_render() {
        struct Cancelled;
        impl PromptSource for Cancelled {
            fn request(&self, _: &[String]) -> Result<IndexMap<String, String>> {
                Err(Error::PromptRequestFailed("user cancelled".to_string()))
            }
        }
        let err = RenderBatch::new()
            .provider(mapping(&[("title", "x")]))
            .template(Template::flat("a", "{title}"))
            .template(Template::flat("b", "{prompt_q}"))
            .prompt_source(&Cancelled)
            .run()
            .unwrap_err();
        // even template "a", which needs no prompt, never rendered
        assert!(matches!(err, Error::PromptRequestFailed(_)));
    }

    #[test]
    fn two_batches_share_nothing() {
        let source = RecordingSource::new(&[("prompt_q", "first")]);
        let first = RenderBatch::new()
            .template(Template::flat("t", "{prompt_q}"))
            .prompt_source(&source)
            .run()
            .unwrap();
        let second = RenderBatch::new()
            .template(Template::flat("t", "{prompt_q}"))
            .prompt_source(&source)
            .run()
            .unwrap();
        // the second batch re-enters scanning and asks again
        assert_eq!(source.calls.get(), 2);
        assert_eq!(first.get("t").unwrap().as_ref().unwrap(), "first");
        assert_eq!(second.get("t").unwrap().as_ref().unwrap(), "first");
    }

    #[test]
    fn mixed_batch_with_media_context() {
        let context = RenderContext::new()
            .with_media_input(MediaInput {
                file_name: "movie.2013.mkv".to_string(),
                video: Some(VideoStream {
                    codec: "HEVC".to_string(),
                    width: 1920,
                    height: 1080,
                    ..Default::default()
                }),
                ..Default::default()
            })
            .with_screen_shots(vec!["https://img/1.png".to_string()]);

        let outcome = RenderBatch::new()
            .provider(mapping(&[("title", "Coherence")]))
            .render_context(context)
            .template(Template::flat("name", "{title}"))
            .template(Template::document(
                "nfo",
                "{{ title }} [{{ nf_media_input.video.codec }} \
                 {{ nf_media_input.video.width }}x{{ nf_media_input.video.height }}]\n\
                 {{ nf_screen_shots() }}",
            ))
            .run()
            .unwrap();

        assert_eq!(outcome.get("name").unwrap().as_ref().unwrap(), "Coherence");
        let nfo = outcome.get("nfo").unwrap().as_ref().unwrap();
        assert!(nfo.contains("Coherence [HEVC 1920x1080]"));
        assert!(nfo.contains("https://img/1.png"));
    }
}
