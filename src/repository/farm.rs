use async_trait::async_trait;
use uuid::Uuid;

use super::Repository;
use crate::error::AgroError;
use crate::error::Result;
use crate::model::Farm;
use crate::model::FarmDraft;
use crate::model::FarmFilter;
use crate::model::FarmPatch;
use crate::model::NewFarm;
use crate::model::Resource;
use crate::primary::PrimaryStore;
use crate::types::Record;
use crate::types::RelationKind;
use crate::validation::check_areas;
use crate::validation::require;

fn patched(field: &'static str, new: Option<String>, old: String) -> Result<String> {
    match new {
        Some(value) => Ok(require(field, &value)?.to_string()),
        None => Ok(old),
    }
}

#[async_trait]
impl Resource for Farm {
    type Draft = FarmDraft;
    type Filter = FarmFilter;
    type Input = NewFarm;
    type Patch = FarmPatch;

    const NAME: &'static str = "farm";
    const RELATIONS: &'static [RelationKind] = &[RelationKind::Producer, RelationKind::Crops];

    fn id(&self) -> Uuid {
        self.id
    }

    async fn prepare_create(_store: &dyn PrimaryStore<Self>, input: NewFarm) -> Result<FarmDraft, AgroError> {
        require("name", &input.name)?;
        require("city", &input.city)?;
        require("state", &input.state)?;
        check_areas(input.total_area, input.arable_area, input.vegetation_area)?;

        Ok(FarmDraft {
            id:              None,
            name:            input.name,
            city:            input.city,
            state:           input.state,
            total_area:      input.total_area,
            arable_area:     input.arable_area,
            vegetation_area: input.vegetation_area,
            producer_id:     input.producer_id,
        })
    }

    async fn prepare_update(
        _store: &dyn PrimaryStore<Self>,
        current: Self,
        patch: FarmPatch,
    ) -> Result<FarmDraft, AgroError> {
        let total_area = patch.total_area.unwrap_or(current.total_area);
        let arable_area = patch.arable_area.unwrap_or(current.arable_area);
        let vegetation_area = patch.vegetation_area.unwrap_or(current.vegetation_area);
        check_areas(total_area, arable_area, vegetation_area)?;

        Ok(FarmDraft {
            id: Some(current.id),
            name: patched("name", patch.name, current.name)?,
            city: patched("city", patch.city, current.city)?,
            state: patched("state", patch.state, current.state)?,
            total_area,
            arable_area,
            vegetation_area,
            producer_id: patch.producer_id.unwrap_or(current.producer_id),
        })
    }
}

impl Repository<Farm> {
    /// Every farm, ordered by name. Relations are not loaded.
    pub async fn list_all(&self) -> Result<Vec<Farm>> {
        Ok(self.query(&FarmFilter::All).await?.into_inner())
    }

    /// Case-insensitive.
    pub async fn search_by_name(&self, name: &str) -> Result<Vec<Farm>> {
        Ok(self.query(&FarmFilter::NameContains(name.to_string())).await?.into_inner())
    }

    pub async fn search_by_location(&self, state: &str, city: Option<&str>) -> Result<Vec<Farm>> {
        let filter = FarmFilter::Location {
            state: state.to_string(),
            city:  city.map(str::to_string),
        };
        Ok(self.query(&filter).await?.into_inner())
    }

    /// Farms of a producer, cached under `farm:producer:<id>`.
    pub async fn list_by_producer(&self, producer_id: Uuid) -> Result<Record<Vec<Farm>>> {
        self.query(&FarmFilter::Producer(producer_id)).await
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::error::ValidationError;
    use crate::model::FarmPatch;
    use crate::test::fixtures;
    use crate::test::Harness;

    #[tokio::test]
    async fn area_invariant_on_create() {
        let h = Harness::new().await;
        let p = h.seed_producer().await;

        let err = h
            .farms
            .create(fixtures::new_farm(p.id, 100.0, 60.0, 50.0))
            .await
            .unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::AreaInvariantViolated {
                total:      100.0,
                arable:     60.0,
                vegetation: 50.0,
            })
        );
        assert_eq!(h.store.farm_count(), 0);

        let farm = h.farms.create(fixtures::new_farm(p.id, 100.0, 60.0, 40.0)).await.unwrap();
        assert_eq!(farm.producer.as_ref().map(|p| p.name.as_str()), Some("Ana"));
        assert!(farm.crops.is_empty());
    }

    #[tokio::test]
    async fn area_invariant_uses_resulting_values() {
        let h = Harness::new().await;
        let p = h.seed_producer().await;
        let farm = h.farms.create(fixtures::new_farm(p.id, 100.0, 60.0, 30.0)).await.unwrap();

        // 60 + 45 > 100 with the current arable area.
        let err = h
            .farms
            .update(
                farm.id,
                FarmPatch {
                    vegetation_area: Some(45.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::AreaInvariantViolated { .. })
        ));

        // Growing the total along with it is fine.
        let updated = h
            .farms
            .update(
                farm.id,
                FarmPatch {
                    total_area: Some(120.0),
                    vegetation_area: Some(45.0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total_area, 120.0);
        assert_eq!(updated.arable_area, 60.0);
        assert_eq!(updated.vegetation_area, 45.0);
    }

    #[tokio::test]
    async fn negative_area() {
        let h = Harness::new().await;
        let p = h.seed_producer().await;
        let err = h
            .farms
            .create(fixtures::new_farm(p.id, 100.0, -1.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::InvalidArea { field: "arableArea", .. })
        ));
    }

    #[tokio::test]
    async fn missing_producer_is_not_found() {
        let h = Harness::new().await;
        let ghost = Uuid::new_v4();
        let err = h
            .farms
            .create(fixtures::new_farm(ghost, 100.0, 10.0, 10.0))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), format!("producer '{ghost}' not found"));
    }

    #[tokio::test]
    async fn blank_city_in_patch() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;
        let err = h
            .farms
            .update(
                farm.id,
                FarmPatch {
                    city: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::MissingRequiredField("city")));
    }

    #[tokio::test]
    async fn location_search() {
        let h = Harness::new().await;
        let p = h.seed_producer().await;
        for (name, city, state) in [
            ("Boa Vista", "Sorriso", "MT"),
            ("Santa Rita", "Sinop", "MT"),
            ("Primavera", "Rio Verde", "GO"),
        ] {
            let mut input = fixtures::new_farm(p.id, 100.0, 50.0, 20.0);
            input.name = name.into();
            input.city = city.into();
            input.state = state.into();
            h.farms.create(input).await.unwrap();
        }

        assert_eq!(h.farms.search_by_location("MT", None).await.unwrap().len(), 2);
        let sinop = h.farms.search_by_location("MT", Some("Sinop")).await.unwrap();
        assert_eq!(sinop.len(), 1);
        assert_eq!(sinop[0].name, "Santa Rita");
        assert!(h.farms.search_by_location("SP", None).await.unwrap().is_empty());
        assert_eq!(h.farms.search_by_name("vista").await.unwrap().len(), 1);
        assert_eq!(h.farms.search_by_name("SANTA").await.unwrap().len(), 1);

        let all = h.farms.list_all().await.unwrap();
        let names: Vec<&str> = all.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Boa Vista", "Primavera", "Santa Rita"]);
    }

    #[tokio::test]
    async fn producer_listing_is_cached() {
        let h = Harness::new().await;
        let farm = h.seed_farm().await;

        let first = h.farms.list_by_producer(farm.producer_id).await.unwrap();
        assert!(first.is_fresh());
        assert_eq!(first.len(), 1);
        // Listed farms carry no relations.
        assert!(first[0].producer.is_none());

        let second = h.farms.list_by_producer(farm.producer_id).await.unwrap();
        assert!(second.is_snapshot());
        assert_eq!(*second, *first);

        // Empty listings are neither cached nor an error.
        let none = h.farms.list_by_producer(Uuid::new_v4()).await.unwrap();
        assert!(none.is_empty());
    }
}
