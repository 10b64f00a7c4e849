use sculptor_core::ai::mock::MockBehavior;
use sculptor_core::ai::{self, AiError, MessageRole, Model};
use sculptor_core::catalog::ENVIRONMENT_ID;
use sculptor_core::recipe::ParamError;
use sculptor_core::settings::manager::SettingsManager;
use sculptor_core::settings::{ProviderConfig, Settings};
use sculptor_core::AiProvider;
use sculptor_core::workbench::ChatRole;
use sculptor_core::{
    build_system_instruction, Applied, Recipe, SessionError, SessionInputs, SessionManager,
    WorkbenchError,
};


use fixture::verilog_reply;

#[test]
fn test_generation_flow() {
    fixture::run(
        verilog_reply("module comp(a, y); endmodule", "uses cross()"),
        |mut fixture| async move {
            fixture.workbench.add_block("comp").unwrap();

            let result = fixture.workbench.generate().await.unwrap();
            assert_eq!(result.code, "module comp(a, y); endmodule");
            assert_eq!(result.explanation, "Sculptor Insight: uses cross()");

            let request = fixture.last_request();
            assert_eq!(
                request.system_prompt,
                build_system_instruction(&fixture.workbench.session_inputs())
            );
            assert_eq!(request.messages.len(), 1);
            assert_eq!(request.messages[0].role, MessageRole::User);
            assert!(request.messages[0]
                .content
                .starts_with("Generate a Verilog-A model of a voltage comparator"));
            assert_eq!(request.model.temperature, Some(0.1));

            let transcript = fixture.workbench.transcript();
            assert_eq!(transcript.len(), 2);
            assert_eq!(transcript[0].role, ChatRole::User);
            assert_eq!(transcript[1].role, ChatRole::Model);
            assert_eq!(
                transcript[1].code.as_deref(),
                Some("module comp(a, y); endmodule")
            );
            assert!(!fixture.workbench.is_busy());
        },
    );
}

#[test]
fn test_session_is_reused_until_an_edit() {
    fixture::run(MockBehavior::Success, |mut fixture| async move {
        fixture.workbench.add_block("opamp").unwrap();

        fixture.workbench.generate().await.unwrap();
        let first = fixture.workbench.current_session().unwrap().id();

        fixture.workbench.generate().await.unwrap();
        assert_eq!(fixture.workbench.current_session().unwrap().id(), first);
        assert_eq!(fixture.last_request().messages.len(), 3);

        fixture.workbench.set_customization("Add a `busy` output.");
        fixture.workbench.generate().await.unwrap();

        assert_ne!(fixture.workbench.current_session().unwrap().id(), first);
        let request = fixture.last_request();
        assert_eq!(request.messages.len(), 1);
        assert!(request
            .system_prompt
            .contains("CUSTOMIZATION:\nAdd a `busy` output."));
        assert_eq!(fixture.call_count(), 3);
    });
}

#[test]
fn test_reply_from_replaced_session_is_discarded() {
    fixture::run(
        verilog_reply("module old; endmodule", "stale"),
        |mut fixture| async move {
            fixture.workbench.add_block("adc_flash").unwrap();

            let pending = fixture.workbench.begin_generation().unwrap();
            let stale_id = pending.session_id();

            // Edit and re-sync while the request is in flight
            fixture
                .workbench
                .set_param(ENVIRONMENT_ID, "power_style", "dedicated-ports")
                .unwrap();
            let fresh = fixture.workbench.reconcile();
            assert_ne!(fresh.id(), stale_id);

            let outcome = pending.run().await;
            assert!(outcome.result.is_ok());

            let applied = fixture.workbench.apply(outcome).unwrap();
            assert_eq!(applied, Applied::Discarded);
            assert!(fixture.workbench.result().is_none());
            assert!(!fixture.workbench.is_busy());
            assert_eq!(fixture.workbench.transcript().len(), 1);
        },
    );
}

#[test]
fn test_reply_after_reset_is_discarded() {
    fixture::run(
        verilog_reply("module adc; endmodule", "pre-reset"),
        |mut fixture| async move {
            fixture.workbench.add_block("adc_flash").unwrap();

            let pending = fixture.workbench.begin_generation().unwrap();
            fixture.workbench.reset();

            let outcome = pending.run().await;
            assert!(outcome.result.is_ok());

            let applied = fixture.workbench.apply(outcome).unwrap();
            assert_eq!(applied, Applied::Discarded);
            assert!(fixture.workbench.result().is_none());
            assert!(fixture.workbench.transcript().is_empty());
            assert!(!fixture.workbench.is_busy());
        },
    );
}

#[test]
fn test_reply_after_edit_is_discarded() {
    fixture::run(MockBehavior::Success, |mut fixture| async move {
        fixture.workbench.add_block("opamp").unwrap();

        let pending = fixture.workbench.begin_generation().unwrap();
        fixture.workbench.set_customization("Rail-to-rail output.");

        let outcome = pending.run().await;
        assert_eq!(fixture.workbench.apply(outcome).unwrap(), Applied::Discarded);
        assert!(fixture.workbench.result().is_none());

        // The next request carries the edit
        fixture.workbench.generate().await.unwrap();
        assert!(fixture
            .last_request()
            .system_prompt
            .contains("Rail-to-rail output."));
        assert!(fixture.workbench.result().is_some());
    });
}

#[test]
fn test_second_generation_while_busy_is_refused() {
    fixture::run(MockBehavior::Success, |mut fixture| async move {
        fixture.workbench.add_block("logic_dec").unwrap();

        let pending = fixture.workbench.begin_generation().unwrap();
        assert!(fixture.workbench.is_busy());
        assert!(matches!(
            fixture.workbench.begin_generation(),
            Err(WorkbenchError::Busy)
        ));

        let outcome = pending.run().await;
        assert_eq!(fixture.workbench.apply(outcome).unwrap(), Applied::Updated);
        assert!(fixture.workbench.begin_generation().is_ok());
    });
}

#[test]
fn test_failure_keeps_previous_result() {
    fixture::run(
        MockBehavior::BehaviorQueue {
            behaviors: vec![
                verilog_reply("module keep; endmodule", "first"),
                MockBehavior::AlwaysTerminalError,
            ],
        },
        |mut fixture| async move {
            fixture.workbench.add_block("cpump").unwrap();
            fixture.workbench.generate().await.unwrap();

            let err = fixture.workbench.generate().await.unwrap_err();
            assert!(matches!(
                err,
                WorkbenchError::Session(SessionError::Provider(AiError::Terminal(_)))
            ));

            assert_eq!(
                fixture.workbench.result().unwrap().code,
                "module keep; endmodule"
            );
            assert!(!fixture.workbench.is_busy());
            // No retry is attempted
            assert_eq!(fixture.call_count(), 2);
        },
    );
}

#[test]
fn test_nothing_to_generate() {
    fixture::run(MockBehavior::Success, |mut fixture| async move {
        assert!(matches!(
            fixture.workbench.begin_generation(),
            Err(WorkbenchError::NothingToGenerate)
        ));

        fixture.workbench.add_block("custom_note").unwrap();
        assert!(matches!(
            fixture.workbench.begin_generation(),
            Err(WorkbenchError::NothingToGenerate)
        ));
        assert_eq!(fixture.call_count(), 0);

        fixture
            .workbench
            .set_reference_code("module ref(a);\nendmodule");
        fixture.workbench.generate().await.unwrap();

        let request = fixture.last_request();
        assert!(request.system_prompt.contains("module ref(a);\nendmodule"));
        assert!(request.messages[0]
            .content
            .contains("mimics the structure of the reference code"));
    });
}

#[test]
fn test_reset_matches_fresh_instruction() {
    fixture::run(MockBehavior::Success, |mut fixture| async move {
        let pristine = fixture.workbench.reconcile().system_instruction().to_string();

        let id = fixture.workbench.add_block("dac_bin").unwrap();
        fixture.workbench.set_param(&id, "bits", "12").unwrap();
        fixture
            .workbench
            .set_param(ENVIRONMENT_ID, "reset_style", "sync-active-high")
            .unwrap();
        fixture.workbench.set_customization("thermal ports");
        fixture.workbench.set_reference_code("module r; endmodule");
        fixture.workbench.generate().await.unwrap();

        let edited = fixture.workbench.reconcile().system_instruction().to_string();
        assert_ne!(edited, pristine);

        fixture.workbench.reset();
        assert!(fixture.workbench.result().is_none());
        assert!(fixture.workbench.transcript().is_empty());

        let after_reset = fixture.workbench.reconcile();
        assert_eq!(after_reset.system_instruction(), pristine);
        assert_eq!(
            pristine,
            build_system_instruction(&SessionInputs::from_recipe(&Recipe::new(), "", ""))
        );
    });
}

#[test]
fn test_invalid_edits_are_reported() {
    let mut fixture = fixture::Fixture::new();

    assert!(matches!(
        fixture.workbench.remove_block(ENVIRONMENT_ID),
        Err(WorkbenchError::Recipe(_))
    ));
    assert!(matches!(
        fixture.workbench.add_block("not_a_block"),
        Err(WorkbenchError::Recipe(_))
    ));
    assert!(matches!(
        fixture.workbench.set_param(ENVIRONMENT_ID, "vdd", "high"),
        Err(WorkbenchError::Param(_))
    ));
    assert!(matches!(
        fixture.workbench.set_param(ENVIRONMENT_ID, "vth", "0.7"),
        Err(WorkbenchError::Param(ParamError::Derived(_)))
    ));
    assert_eq!(fixture.workbench.recipe().environment().params.vth, None);
}

#[test]
fn test_generate_requires_session() {
    fixture::run(MockBehavior::Success, |fixture| async move {
        let settings = SettingsManager::from_path(fixture.settings_path()).unwrap();
        let provider = ai::create_active_provider(&settings.settings()).unwrap();
        assert_eq!(provider.name(), "mock");

        let manager = SessionManager::new(provider, settings.settings().model_settings());
        let err = manager.generate(None, "Generate").await.unwrap_err();
        assert!(matches!(err, SessionError::NoActiveSession));
    });
}

#[test]
fn test_provider_must_support_configured_model() {
    let mut settings = Settings::default();
    settings.add_provider(
        "gemini".to_string(),
        ProviderConfig::Gemini {
            api_key: "test-key".to_string(),
            base_url: None,
        },
    );
    settings.add_provider(
        "openrouter".to_string(),
        ProviderConfig::OpenRouter {
            api_key: "test-key".to_string(),
        },
    );

    settings.model = Model::Gemini25Flash;
    assert!(ai::create_provider(&settings, "gemini").is_ok());
    assert!(ai::create_provider(&settings, "openrouter").is_ok());

    settings.model = Model::Gpt5;
    let err = ai::create_provider(&settings, "gemini").err().unwrap();
    assert!(err.to_string().contains("not supported"));
    assert!(ai::create_provider(&settings, "openrouter").is_ok());

    settings.model = Model::None;
    assert!(ai::create_provider(&settings, "openrouter").is_err());
}

#[test]
fn test_transient_failure_is_flagged() {
    fixture::run(MockBehavior::AlwaysTransientError, |mut fixture| async move {
        fixture.workbench.add_block("comp").unwrap();

        let err = fixture.workbench.generate().await.unwrap_err();
        assert!(err.is_transient());
        assert!(fixture.workbench.result().is_none());

        fixture.set_mock_behavior(MockBehavior::AlwaysTerminalError);
        let err = fixture.workbench.generate().await.unwrap_err();
        assert!(!err.is_transient());
        assert!(!WorkbenchError::Busy.is_transient());
    });
}
