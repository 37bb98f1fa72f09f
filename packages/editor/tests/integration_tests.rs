//! Integration tests for the editor crate: load, edit, stage and submit

use async_trait::async_trait;
use recipe_editor::{
    edit_to_payload, view_to_edit, EditSession, MediaSlot, MediaStager, Mutation, RecipeWriter,
    SubmitError, SubmitOutcome, SubmitRequest, TransportError, TransportPart,
};
use recipe_model::{
    is_contiguous, GroupText, ImageField, ImageSlot, IngredientEdit, IngredientGroupView,
    IngredientText, IngredientView, LocalFile, LocalIdGenerator, PayloadImage, RecipeText,
    RecipeView, ServerId, StepGroupView, StepText, StepView, Tag, TagRef, TempId, TranslationSet,
};
use std::sync::Mutex;

fn ingredient(id: &str, position: u32, name: &str) -> IngredientView {
    IngredientView {
        id: ServerId::from(id),
        ingredient_id: Some(ServerId::from(format!("cat-{}", name.to_lowercase()))),
        quantity: 100.0,
        unit_id: ServerId::from("g"),
        position,
        translations: TranslationSet::with(
            "en",
            IngredientText {
                name: name.to_string(),
                note: None,
            },
        ),
    }
}

fn step(id: &str, position: u32, text: &str, image_url: Option<&str>) -> StepView {
    StepView {
        id: ServerId::from(id),
        position,
        duration_minutes: Some(5),
        image_url: image_url.map(str::to_string),
        translations: TranslationSet::with(
            "en",
            StepText {
                instruction: text.to_string(),
            },
        ),
    }
}

/// Two ingredient groups of 3 and 1 items, one step group of 2 steps where
/// the second step has a stored image
fn stew() -> RecipeView {
    RecipeView {
        id: ServerId::from("r-42"),
        primary_language: "en".into(),
        translations: TranslationSet::with(
            "en",
            RecipeText {
                title: "Winter stew".to_string(),
                description: Some("Slow and hearty".to_string()),
            },
        ),
        image_url: Some("/assets/recipes/stew.jpg".to_string()),
        servings: 4,
        prep_time_minutes: 20,
        cook_time_minutes: 120,
        author: Some("Ana".to_string()),
        author_id: Some(ServerId::from("u-1")),
        is_private: false,
        created_at: None,
        tags: vec![
            Tag {
                id: ServerId::from("t-1"),
                name: "Winter".to_string(),
            },
            Tag {
                id: ServerId::from("t-2"),
                name: "Beef".to_string(),
            },
        ],
        ingredient_groups: vec![
            IngredientGroupView {
                id: ServerId::from("ig-1"),
                position: 0,
                translations: TranslationSet::with("en", GroupText { title: "Stew".into() }),
                ingredients: vec![
                    ingredient("i-1", 0, "Beef"),
                    ingredient("i-2", 1, "Carrot"),
                    ingredient("i-3", 2, "Onion"),
                ],
            },
            IngredientGroupView {
                id: ServerId::from("ig-2"),
                position: 1,
                translations: TranslationSet::with("en", GroupText { title: "Garnish".into() }),
                ingredients: vec![ingredient("i-4", 0, "Parsley")],
            },
        ],
        step_groups: vec![StepGroupView {
            id: ServerId::from("sg-1"),
            position: 0,
            translations: TranslationSet::with("en", GroupText { title: "Method".into() }),
            steps: vec![
                step("s-1", 0, "Brown the beef", None),
                step("s-2", 1, "Simmer", Some("/assets/recipes/simmer.jpg")),
            ],
        }],
    }
}

#[derive(Default)]
struct RecordingStager {
    fail: bool,
    staged: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaStager for RecordingStager {
    async fn stage_upload(&self, file: &LocalFile) -> Result<TempId, TransportError> {
        if self.fail {
            return Err(TransportError::Request("503 Service Unavailable".into()));
        }
        let name = file.file_name().unwrap_or_default().to_string();
        self.staged.lock().unwrap().push(name.clone());
        Ok(TempId::new(format!("/assets/temp/{}", name)))
    }
}

#[derive(Default)]
struct RecordingWriter {
    requests: Mutex<Vec<SubmitRequest>>,
}

#[async_trait]
impl RecipeWriter for RecordingWriter {
    async fn create(&self, request: SubmitRequest) -> Result<RecipeView, TransportError> {
        self.requests.lock().unwrap().push(request);
        let mut view = stew();
        view.id = ServerId::from("r-new");
        Ok(view)
    }

    async fn update(&self, request: SubmitRequest) -> Result<Option<RecipeView>, TransportError> {
        self.requests.lock().unwrap().push(request);
        Ok(None)
    }
}

#[test]
fn test_round_trip_without_edits() {
    let view = stew();
    let mut ids = LocalIdGenerator::new("rt");

    let payload = edit_to_payload(&view_to_edit(&view, &mut ids)).unwrap();

    assert_eq!(payload.id, Some(view.id.clone()));
    assert_eq!(payload.translations, view.translations);
    assert_eq!(
        payload.image,
        Some(PayloadImage::Remote {
            url: "/assets/recipes/stew.jpg".into()
        })
    );
    assert_eq!(payload.servings, 4);
    assert_eq!(payload.author_id, view.author_id);

    for (pg, vg) in payload.ingredient_groups.iter().zip(&view.ingredient_groups) {
        assert_eq!(pg.id.as_ref(), Some(&vg.id));
        assert_eq!(pg.position, vg.position);
        assert_eq!(pg.translations, vg.translations);
        for (pi, vi) in pg.ingredients.iter().zip(&vg.ingredients) {
            assert_eq!(pi.id.as_ref(), Some(&vi.id));
            assert_eq!(pi.ingredient_id, vi.ingredient_id);
            assert_eq!(pi.quantity, vi.quantity);
            assert_eq!(pi.unit_id, vi.unit_id);
            assert_eq!(pi.position, vi.position);
            assert_eq!(pi.translations, vi.translations);
        }
    }

    let steps = &payload.step_groups[0].steps;
    assert_eq!(steps.len(), 2);
    assert_eq!(
        steps[1].image,
        Some(PayloadImage::Remote {
            url: "/assets/recipes/simmer.jpg".into()
        })
    );
    assert_eq!(steps[0].image, None);
}

#[test]
fn test_tags_keep_their_variant() {
    let mut session = EditSession::load_for_edit("tags", &stew());

    session
        .apply(Mutation::AddTag {
            index: 2,
            tag: TagRef::new_tag("Comfort food"),
        })
        .unwrap();

    let payload = session.payload().unwrap();
    assert_eq!(
        payload.tags,
        vec![
            TagRef::existing("t-1"),
            TagRef::existing("t-2"),
            TagRef::new_tag("Comfort food"),
        ]
    );
}

#[test]
fn test_positions_stay_contiguous() {
    let mut session = EditSession::load_for_edit("pos", &stew());
    let groups = &session.recipe().ingredient_groups;
    let stew_group = groups[0].identity.local.clone().unwrap();
    let garnish_group = groups[1].identity.local.clone().unwrap();
    let onion = groups[0].ingredients[2].identity.local.clone().unwrap();

    session
        .apply(Mutation::MoveIngredient {
            ingredient_id: onion,
            group_id: garnish_group.clone(),
            index: 0,
        })
        .unwrap();
    session
        .apply(Mutation::InsertIngredient {
            group_id: stew_group,
            index: 1,
            ingredient: IngredientEdit::new(2.0, "pc").named("en", "Bay leaf"),
        })
        .unwrap();
    session
        .apply(Mutation::MoveIngredientGroup {
            group_id: garnish_group,
            index: 0,
        })
        .unwrap();

    let recipe = session.recipe();
    assert!(is_contiguous(&recipe.ingredient_groups));
    for group in &recipe.ingredient_groups {
        assert!(is_contiguous(&group.ingredients));
    }

    let payload = session.payload().unwrap();
    for (g, group) in payload.ingredient_groups.iter().enumerate() {
        assert_eq!(group.position as usize, g);
        for (i, ingredient) in group.ingredients.iter().enumerate() {
            assert_eq!(ingredient.position as usize, i);
        }
    }
}

#[tokio::test]
async fn test_edit_scenario_end_to_end() -> anyhow::Result<()> {
    let mut session = EditSession::load_for_edit("e2e", &stew());
    let recipe = session.recipe();
    let beef = recipe.ingredient_groups[0].ingredients[0].identity.local.clone().unwrap();
    let garnish = recipe.ingredient_groups[1].identity.local.clone().unwrap();
    let simmer = recipe.step_groups[0].steps[1].identity.local.clone().unwrap();

    session.apply(Mutation::RemoveIngredient { ingredient_id: beef })?;
    session.apply(Mutation::InsertIngredient {
        group_id: garnish,
        index: 1,
        ingredient: IngredientEdit::new(1.0, "pc").named("en", "Lemon"),
    })?;
    session.apply(Mutation::SetImage {
        target: recipe_editor::ImageTarget::Step(simmer),
        image: ImageField::LocalPending {
            file: LocalFile::new("/home/ana/simmer-better.png"),
        },
    })?;

    let stager = RecordingStager::default();
    let writer = RecordingWriter::default();
    let outcome = session.submit(&stager, &writer).await?;

    assert_eq!(outcome, SubmitOutcome::Updated(None));
    assert_eq!(*stager.staged.lock().unwrap(), vec!["simmer-better.png"]);

    let requests = writer.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    let payload = &request.metadata;

    let positions = |g: usize| -> Vec<u32> {
        payload.ingredient_groups[g]
            .ingredients
            .iter()
            .map(|i| i.position)
            .collect()
    };
    assert_eq!(positions(0), vec![0, 1]);
    assert_eq!(positions(1), vec![0, 1]);
    assert_eq!(payload.ingredient_groups[1].ingredients[1].id, None);

    assert_eq!(
        payload.step_groups[0].steps[1].image,
        Some(PayloadImage::Staged {
            temp_id: TempId::new("/assets/temp/simmer-better.png")
        })
    );

    let parts: Vec<_> = request.parts().collect();
    assert!(matches!(parts[0], TransportPart::Metadata(_)));
    assert_eq!(request.media.len(), 1);
    assert_eq!(
        request.media[0].slot,
        ImageSlot::Step {
            group_position: 0,
            step_position: 1
        }
    );

    // Local ids must never reach the wire
    let json = serde_json::to_string(request)?;
    assert!(!json.contains("e2e-"), "local id leaked: {}", json);
    Ok(())
}

#[tokio::test]
async fn test_failed_staging_keeps_local_file() {
    let mut session = EditSession::load_for_edit("fail", &stew());
    session
        .apply(Mutation::SetImage {
            target: recipe_editor::ImageTarget::Recipe,
            image: ImageField::LocalPending {
                file: LocalFile::new("cover.png"),
            },
        })
        .unwrap();

    let stager = RecordingStager {
        fail: true,
        ..Default::default()
    };
    let writer = RecordingWriter::default();

    let err = session.submit(&stager, &writer).await.unwrap_err();

    assert_eq!(
        err,
        SubmitError::Staging {
            slot: MediaSlot::RecipeImage,
            source: TransportError::Request("503 Service Unavailable".into()),
        }
    );
    assert!(session.recipe().image.is_pending_upload());
    assert!(writer.requests.lock().unwrap().is_empty());

    // Retrying with a healthy stager succeeds
    let healthy = RecordingStager::default();
    session.submit(&healthy, &writer).await.unwrap();
    assert_eq!(writer.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_new_recipe_is_created() {
    let mut session = EditSession::new_recipe("new", "en");
    session
        .apply(Mutation::SetTranslation {
            target: recipe_editor::EntityRef::Recipe,
            language: "en".into(),
            text: recipe_editor::EntityText::Recipe(RecipeText {
                title: "Flatbread".into(),
                description: None,
            }),
            translation_id: None,
        })
        .unwrap();

    let writer = RecordingWriter::default();
    let outcome = session
        .submit(&RecordingStager::default(), &writer)
        .await
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Created(ref view) if view.id.as_str() == "r-new"));
    assert!(writer.requests.lock().unwrap()[0].is_create());
}

#[tokio::test]
async fn test_missing_translation_blocks_submit() {
    let mut view = stew();
    view.primary_language = "fr".into();
    view.translations.upsert(
        "fr",
        RecipeText {
            title: "Ragoût d'hiver".into(),
            description: None,
        },
    );
    let mut session = EditSession::load_for_edit("fr", &view);
    let writer = RecordingWriter::default();

    let err = session
        .submit(&RecordingStager::default(), &writer)
        .await
        .unwrap_err();

    assert!(!err.is_retriable());
    let SubmitError::Incomplete(incomplete) = &err else {
        panic!("expected incomplete aggregate, got {:?}", err);
    };
    // 2 ingredient groups, 4 ingredients, 1 step group, 2 steps
    assert_eq!(incomplete.missing.len(), 9);
    let text = err.to_string();
    assert!(text.contains("step 1 of step group 0 has no 'fr' translation"), "{}", text);
    assert!(writer.requests.lock().unwrap().is_empty());
}
