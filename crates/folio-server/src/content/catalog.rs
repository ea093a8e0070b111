//! Public catalogue: courses, projects, services, team, process, packages.

use folio_core::slug::find_service;
use folio_core::{
    Course, CourseFilter, FolioError, ProcessStep, Project, ProjectFilter, Service,
    ServicePackage, TeamMember,
};

use super::collection::Collection;
use super::live::LiveFeed;
use super::{ContentResult, ContentService};

impl ContentService {
    pub fn courses(&self) -> ContentResult<Collection<Course>> {
        self.collection()
    }

    pub fn projects(&self) -> ContentResult<Collection<Project>> {
        self.collection()
    }

    pub fn services(&self) -> ContentResult<Collection<Service>> {
        self.collection()
    }

    pub fn process(&self) -> ContentResult<Collection<ProcessStep>> {
        self.collection()
    }

    pub fn packages(&self) -> ContentResult<Collection<ServicePackage>> {
        self.collection()
    }

    pub fn team(&self) -> ContentResult<Collection<TeamMember>> {
        self.collection()
    }

    /// Published courses matching the filter (case-insensitive).
    pub async fn get_courses(&self, filter: &CourseFilter) -> ContentResult<Vec<Course>> {
        let mut courses = self.courses()?.list_public().await?;
        courses.retain(|course| filter.matches(course));
        Ok(courses)
    }

    pub async fn get_projects(&self, filter: &ProjectFilter) -> ContentResult<Vec<Project>> {
        let mut projects = self.projects()?.list_public().await?;
        projects.retain(|project| filter.matches(project));
        Ok(projects)
    }

    pub async fn get_services(&self) -> ContentResult<Vec<Service>> {
        self.services()?.list_public().await
    }

    /// A published service by id or slug. The first four services also
    /// answer to their legacy slugs.
    pub async fn get_service(&self, id_or_slug: &str) -> ContentResult<Service> {
        let services = self.get_services().await?;
        find_service(&services, id_or_slug)
            .cloned()
            .ok_or_else(|| FolioError::not_found("service", id_or_slug).into())
    }

    pub async fn get_team(&self) -> ContentResult<Vec<TeamMember>> {
        self.team()?.list_public().await
    }

    pub async fn get_process(&self) -> ContentResult<Vec<ProcessStep>> {
        self.process()?.list_public().await
    }

    pub async fn get_packages(&self) -> ContentResult<Vec<ServicePackage>> {
        self.packages()?.list_public().await
    }

    pub fn subscribe_to_courses(&self) -> ContentResult<LiveFeed<Vec<Course>>> {
        Ok(self.courses()?.subscribe())
    }

    pub fn subscribe_to_projects(&self) -> ContentResult<LiveFeed<Vec<Project>>> {
        Ok(self.projects()?.subscribe())
    }

    pub fn subscribe_to_services(&self) -> ContentResult<LiveFeed<Vec<Service>>> {
        Ok(self.services()?.subscribe())
    }

    pub fn subscribe_to_team(&self) -> ContentResult<LiveFeed<Vec<TeamMember>>> {
        Ok(self.team()?.subscribe())
    }

    pub fn subscribe_to_process(&self) -> ContentResult<LiveFeed<Vec<ProcessStep>>> {
        Ok(self.process()?.subscribe())
    }

    pub fn subscribe_to_packages(&self) -> ContentResult<LiveFeed<Vec<ServicePackage>>> {
        Ok(self.packages()?.subscribe())
    }
}
