use nalgebra as na;

/// Position in the 2-D world.
pub type Point = na::Point2<f32>;
/// Velocity or force in the 2-D world.
pub type Vector = na::Vector2<f32>;

/// Anything with a position and a physical radius.
pub trait Body {
    fn position(&self) -> Point;
    fn size(&self) -> f32;
}

/// A controllable agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub id: usize,
    pub name: String,
    pub position: Point,
    pub velocity: Vector,
    /// Communication state, `dim_c` wide.
    pub comm: Vec<f32>,
    pub size: f32,
    pub collide: bool,
    pub silent: bool,
}

impl Agent {
    pub fn new(id: usize, size: f32, dim_c: usize) -> Self {
        Agent {
            id,
            name: format!("agent {id}"),
            position: Point::origin(),
            velocity: Vector::zeros(),
            comm: vec![0.0; dim_c],
            size,
            collide: true,
            silent: true,
        }
    }
}

impl Body for Agent {
    fn position(&self) -> Point {
        self.position
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// A static landmark that agents try to cover.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub name: String,
    pub position: Point,
    pub size: f32,
    pub collide: bool,
    pub movable: bool,
}

impl Landmark {
    pub fn new(index: usize, size: f32) -> Self {
        Landmark {
            name: format!("landmark {index}"),
            position: Point::origin(),
            size,
            collide: false,
            movable: false,
        }
    }
}

impl Body for Landmark {
    fn position(&self) -> Point {
        self.position
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// True iff the two bodies overlap: center distance below the sum of radii.
pub fn is_collision(a: &impl Body, b: &impl Body) -> bool {
    na::distance(&a.position(), &b.position()) < a.size() + b.size()
}
