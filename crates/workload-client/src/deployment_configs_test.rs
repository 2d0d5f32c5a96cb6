//! Unit tests for DeploymentConfig operations

#[cfg(test)]
mod tests {
    use crate::error::WorkloadError;
    use crate::test_utils::*;
    use crate::wait::{WaitRequest, predicates};
    use cluster_client::Verb;
    use crds::{
        CONDITION_PROGRESSING, DeploymentCondition, DeploymentConfigStatus, REASON_NEW_RC_AVAILABLE, REASON_TIMED_OUT,
    };
    use k8s_openapi::api::core::v1::EnvVar;
    use std::collections::BTreeMap;
    use std::time::Duration;

    const PART_OF: &str = "app.kubernetes.io/part-of";
    const COMPONENT: &str = "app.kubernetes.io/component-name";

    #[tokio::test]
    async fn test_label_values_are_sorted() {
        // Same result whichever order the server lists them in
        for names in [["comp-0", "comp-1"], ["comp-1", "comp-0"]] {
            let fixture = Fixture::with_deployment_configs(
                names
                    .iter()
                    .map(|n| create_test_deployment_config(n, &[(PART_OF, "app"), (COMPONENT, *n)])),
            );

            let values = fixture
                .client
                .get_deployment_config_label_values(COMPONENT, &format!("{PART_OF}=app"))
                .await
                .unwrap();
            assert_eq!(values, vec!["comp-0", "comp-1"]);
        }
    }

    #[tokio::test]
    async fn test_label_values_skip_unlabelled_configs() {
        let fixture = Fixture::with_deployment_configs([
            create_test_deployment_config("comp-0", &[(PART_OF, "app"), (COMPONENT, "comp-0")]),
            create_test_deployment_config("other", &[(PART_OF, "app")]),
            create_test_deployment_config("comp-2", &[(PART_OF, "app2"), (COMPONENT, "comp-2")]),
        ]);

        let values = fixture
            .client
            .get_deployment_config_label_values(COMPONENT, &format!("{PART_OF}=app"))
            .await
            .unwrap();
        assert_eq!(values, vec!["comp-0"]);
    }

    #[tokio::test]
    async fn test_list_forwards_selector() {
        let fixture = Fixture::with_deployment_configs([
            create_test_deployment_config("nodejs", &[(PART_OF, "app")]),
            create_test_deployment_config("ruby", &[(PART_OF, "app2")]),
        ]);
        let selector = format!("{PART_OF}=app");

        let dcs = fixture.client.list_deployment_configs(&selector).await.unwrap();
        assert_eq!(dcs.len(), 1);
        assert_eq!(dcs[0].metadata.name.as_deref(), Some("nodejs"));

        let actions = fixture.deployment_configs.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].verb, Verb::List);
        assert_eq!(actions[0].label_selector.as_deref(), Some(selector.as_str()));
    }

    #[tokio::test]
    async fn test_list_failure_names_operation() {
        let fixture = Fixture::new();
        fixture.deployment_configs.fail_next(Verb::List, 500, "etcd unavailable");

        let err = fixture.client.list_deployment_configs("app=nodejs").await.unwrap_err();
        assert!(matches!(err, WorkloadError::Cluster { operation: "list", .. }));
    }

    #[tokio::test]
    async fn test_from_selector_exactly_one() {
        let fixture = Fixture::with_deployment_configs([
            create_test_deployment_config("nodejs", &[(COMPONENT, "nodejs")]),
            create_test_deployment_config("ruby", &[(COMPONENT, "ruby")]),
        ]);

        let dc = fixture
            .client
            .get_deployment_config_from_selector(&format!("{COMPONENT}=nodejs"))
            .await
            .unwrap();
        assert_eq!(dc.metadata.name.as_deref(), Some("nodejs"));
    }

    #[tokio::test]
    async fn test_from_selector_none() {
        let fixture = Fixture::with_deployment_configs([create_test_deployment_config(
            "ruby",
            &[(COMPONENT, "ruby")],
        )]);

        let err = fixture
            .client
            .get_deployment_config_from_selector(&format!("{COMPONENT}=nodejs"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_from_selector_multiple() {
        let fixture = Fixture::with_deployment_configs([
            create_test_deployment_config("nodejs", &[(PART_OF, "app")]),
            create_test_deployment_config("ruby", &[(PART_OF, "app")]),
        ]);

        let err = fixture
            .client
            .get_deployment_config_from_selector(&format!("{PART_OF}=app"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkloadError::MultipleMatches { count: 2, .. }));
        assert!(err.to_string().contains("Only one must be present"));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let fixture = Fixture::new();
        let err = fixture.client.get_deployment_config("nodejs").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_empty_name_is_usage_error() {
        let fixture = Fixture::new();
        let err = fixture.client.get_deployment_config("").await.unwrap_err();
        assert!(err.is_usage());
        assert!(fixture.deployment_configs.actions().is_empty());
    }

    #[tokio::test]
    async fn test_start_deployment_posts_instantiate_request() {
        let fixture = Fixture::with_deployment_configs([create_test_deployment_config("ruby", &[])]);

        let dc = fixture.client.start_deployment("ruby").await.unwrap();
        assert_eq!(dc.metadata.name.as_deref(), Some("ruby"));
        // the response already carries the new revision
        assert_eq!(dc.latest_version(), 1);

        let actions = fixture.deployment_configs.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].verb, Verb::CreateSubresource);
        assert_eq!(actions[0].subresource.as_deref(), Some("instantiate"));
        assert_eq!(actions[0].name.as_deref(), Some("ruby"));

        let body = actions[0].object.as_ref().unwrap();
        assert_eq!(body["kind"], "DeploymentRequest");
        assert_eq!(body["name"], "ruby");
        assert_eq!(body["latest"], true);
        assert_eq!(body["force"], true);
    }

    #[tokio::test]
    async fn test_start_deployment_empty_name() {
        let fixture = Fixture::new();
        let err = fixture.client.start_deployment("").await.unwrap_err();
        assert!(err.is_usage());
        assert!(fixture.deployment_configs.actions().is_empty());
    }

    #[tokio::test]
    async fn test_env_vars_from_first_container() {
        let env = vec![EnvVar {
            name: "key".to_string(),
            value: Some("value".to_string()),
            ..Default::default()
        }];
        let fixture = Fixture::with_deployment_configs([create_test_deployment_config_with_env(
            "nodejs",
            env.clone(),
        )]);

        let found = fixture
            .client
            .get_env_vars_from_deployment_config("nodejs")
            .await
            .unwrap();
        assert_eq!(found, env);
    }

    #[tokio::test]
    async fn test_update_annotations_replaces_map() {
        let mut dc = create_test_deployment_config("nodejs", &[]);
        dc.metadata.annotations = Some(BTreeMap::from([("old".to_string(), "gone".to_string())]));
        let fixture = Fixture::with_deployment_configs([dc]);

        let annotations = BTreeMap::from([
            ("app.kubernetes.io/url".to_string(), "https://github.com/sclorg/nodejs-ex".to_string()),
            ("app.kubernetes.io/component-source-type".to_string(), "git".to_string()),
        ]);
        let updated = fixture
            .client
            .update_deployment_config_annotations("nodejs", annotations.clone())
            .await
            .unwrap();
        assert_eq!(updated.metadata.annotations.as_ref(), Some(&annotations));

        let actions = fixture.deployment_configs.actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].verb, Verb::Get);
        assert_eq!(actions[1].verb, Verb::Update);
        assert_eq!(
            fixture.deployment_configs.object("nodejs").unwrap().metadata.annotations,
            Some(annotations)
        );
    }

    #[tokio::test]
    async fn test_update_annotations_missing_config() {
        let fixture = Fixture::new();
        let err = fixture
            .client
            .update_deployment_config_annotations("nodejs", BTreeMap::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let actions = fixture.deployment_configs.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].verb, Verb::Get);
    }

    #[tokio::test]
    async fn test_wait_and_get_deployment_config() {
        let fixture = Fixture::new();
        let fake = fixture.deployment_configs.fake_watch();
        fake.add(create_test_deployment_config("foo", &[]));

        let dc = fixture
            .client
            .wait_and_get_deployment_config(&WaitRequest::new("foo", Duration::from_secs(3)), |_, _| true)
            .await
            .unwrap();
        assert_eq!(dc.metadata.name.as_deref(), Some("foo"));
        assert_eq!(fixture.deployment_configs.released_watches(), 1);
    }

    #[tokio::test]
    async fn test_redeploy_and_wait_waits_for_next_revision() {
        let fixture = Fixture::with_deployment_configs([create_test_deployment_config("nodejs", &[])]);
        let fake = fixture.deployment_configs.fake_watch();

        let rolled_out = |latest_version: i64| {
            let mut dc = create_test_deployment_config("nodejs", &[]);
            dc.status = Some(DeploymentConfigStatus {
                latest_version,
                conditions: vec![DeploymentCondition {
                    type_: CONDITION_PROGRESSING.to_string(),
                    status: "True".to_string(),
                    reason: Some(REASON_NEW_RC_AVAILABLE.to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            });
            dc
        };
        // Previous rollout is still reported first
        fake.add(rolled_out(0));
        fake.modify(rolled_out(1));

        let dc = fixture
            .client
            .redeploy_and_wait("nodejs", Duration::from_secs(3))
            .await
            .unwrap();
        assert_eq!(dc.latest_version(), 1);

        let verbs: Vec<Verb> = fixture.deployment_configs.actions().iter().map(|a| a.verb).collect();
        assert_eq!(verbs, vec![Verb::Get, Verb::CreateSubresource, Verb::Watch]);
        assert!(predicates::is_rolled_out(1)(&dc, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_redeploy_and_wait_fails_on_progress_deadline() {
        let fixture = Fixture::with_deployment_configs([create_test_deployment_config("nodejs", &[])]);
        let fake = fixture.deployment_configs.fake_watch();

        let mut stalled = create_test_deployment_config("nodejs", &[]);
        stalled.status = Some(DeploymentConfigStatus {
            latest_version: 1,
            conditions: vec![DeploymentCondition {
                type_: CONDITION_PROGRESSING.to_string(),
                status: "False".to_string(),
                reason: Some(REASON_TIMED_OUT.to_string()),
                message: Some("replication controller \"nodejs-1\" has failed progressing".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
        fake.modify(stalled);

        let started = tokio::time::Instant::now();
        let err = fixture
            .client
            .redeploy_and_wait("nodejs", Duration::from_secs(600))
            .await
            .unwrap_err();

        match &err {
            WorkloadError::RolloutFailed { revision, message, .. } => {
                assert_eq!(*revision, 1);
                assert!(message.contains("nodejs-1"));
            }
            other => panic!("expected rollout failure, got {other}"),
        }
        assert!(!err.is_timeout());
        assert!(started.elapsed() < Duration::from_secs(600));
        assert_eq!(fixture.deployment_configs.released_watches(), 1);
    }
}
